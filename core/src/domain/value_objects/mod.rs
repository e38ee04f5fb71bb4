//! Value objects representing immutable domain concepts.

pub mod verification;

pub use verification::{VerificationFailure, VerificationOutcome};
