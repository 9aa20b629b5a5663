//! qrgen HTTP API
//!
//! Router, handlers and server setup for the code generation endpoint.

pub mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::generate::{GenerateRequest, GenerateResponse};
pub use handlers::health::HealthResponse;
pub use state::AppState;
