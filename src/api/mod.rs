//! HTTP API: DTOs, extractors, and handlers.

pub mod dto;
pub mod extract;
pub mod handlers;
