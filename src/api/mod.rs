//! Localhost HTTP API: routing, request context, endpoint handlers,
//! and the shared error envelope.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
