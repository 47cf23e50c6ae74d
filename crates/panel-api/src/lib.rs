//! HTTP management API.
//!
//! Every endpoint sits behind an `X-API-Key` check against the injected key
//! registry. Success responses use a `{"status": "success", ...}` envelope;
//! failures map the lifecycle error taxonomy onto HTTP status codes.

mod auth;
mod error;
mod handlers;
mod routes;
mod state;


pub mod cli;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
