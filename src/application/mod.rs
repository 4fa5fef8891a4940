//! Application layer: services and their cache-facing read models.

pub mod cache_model;
pub mod services;
