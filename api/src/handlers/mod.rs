//! Conversion of failures into HTTP responses

pub mod error;

pub use error::{domain_error_response, json_error_handler, rate_limited_response, validation_error_response};
