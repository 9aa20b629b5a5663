pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Upper bound on request bodies; `/generate` only takes a short JSON object
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub const NO_URL_MESSAGE: &str = "No URL provided";

pub const QR_FAILED_MESSAGE: &str = "QR code generation failed";
