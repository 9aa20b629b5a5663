//! qrgen Infrastructure Library
//!
//! Shared pieces used by the server and CLI front-ends:
//! - Telemetry initialization (tracing subscriber)
//! - JSON error body for HTTP responses
//! - Request ID middleware

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "middleware")]
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryOptions, DEFAULT_FILTER};

pub use error::ErrorResponse;
