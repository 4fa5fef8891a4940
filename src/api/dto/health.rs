//! DTO for the health endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `healthy`, `degraded` or `disabled`.
    pub cache: &'static str,
}
