//! Infrastructure layer: cache backends and durable stores.

pub mod cache;
pub mod persistence;
