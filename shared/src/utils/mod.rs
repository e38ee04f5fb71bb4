//! Common utility functions

pub mod email;
