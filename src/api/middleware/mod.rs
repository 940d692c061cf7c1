//! API middleware components

pub mod gate;
pub mod logging;

pub use gate::{require_auth, AuthGate, GateStrategy, API_KEY_HEADER};
pub use logging::logging_middleware;
