//! Shared application state for Axum handlers.

use crate::application::services::{LinkService, ProjectService, ResolutionEngine};
use crate::infrastructure::cache::CacheService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolution: Arc<ResolutionEngine>,
    pub link_service: Arc<LinkService>,
    pub project_service: Arc<ProjectService>,
    pub cache: Arc<dyn CacheService>,
    /// False when the cache tier was wired with a no-op backend.
    pub cache_enabled: bool,
    /// Public base URL used when rendering short links.
    pub base_url: String,
}

impl AppState {
    /// Renders the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }
}
