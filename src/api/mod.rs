//! HTTP API.
//!
//! Exposes the readmission service as a small JSON API. The router is
//! composable: `api_router()` returns a `Router` that can be mounted on any
//! axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{api_router, RouterOptions};
pub use server::{serve, shutdown_signal};
pub use types::ApiContext;
