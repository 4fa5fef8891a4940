//! Helper functions used across the application.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_normalizer`] - Original-URL validation and normalization

pub mod code_generator;
pub mod url_normalizer;
