//! Shared API state and response types.

use std::sync::Arc;

use serde::Serialize;

use crate::application::ReadmissionService;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<ReadmissionService>,
}

impl ApiContext {
    pub fn new(service: Arc<ReadmissionService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
