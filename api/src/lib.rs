//! # DevLink API
//!
//! HTTP surface of the one-time code subsystem: issuing and verifying
//! codes, and the password reset and email verification follow-ups.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use app::create_app;
pub use state::{AppState, Backends};
