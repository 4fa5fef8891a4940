//! Short code generation and custom alias validation.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Length of generated short codes.
///
/// 62^7 possible codes keeps the collision probability against any realistic
/// link count low enough that the service-layer retry budget almost never
/// runs out.
pub const GENERATED_CODE_LENGTH: usize = 7;

/// Route names that a custom alias may not shadow.
const RESERVED_ALIASES: &[&str] = &["api", "health", "links", "stats", "popular", "search"];

/// Generates a random alphanumeric short code.
///
/// Uniqueness is the caller's concern: the link service checks the candidate
/// against the store and regenerates on collision.
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Validates a user-provided custom alias.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: lowercase letters, digits, hyphens, underscores
/// - Cannot start or end with a hyphen
/// - Cannot shadow a reserved route name
///
/// Uniqueness is enforced separately by the link store's write path.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.len() < 4 || alias.len() > 32 {
        return Err(AppError::bad_request(
            "Custom alias must be 4-32 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom alias can only contain lowercase letters, digits, hyphens, and underscores",
            json!({ "alias": alias }),
        ));
    }

    if alias.starts_with('-') || alias.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom alias cannot start or end with a hyphen",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES.contains(&alias) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
