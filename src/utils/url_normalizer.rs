//! Original-URL validation and normalization.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Validates and normalizes an original URL.
///
/// Accepts only `http`/`https` URLs with a host. Normalization (lowercased
/// host, default port stripped) comes from the `url` crate's parser, so the
/// stored representation is canonical.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for unparseable URLs or unsupported
/// schemes.
pub fn normalize_url(raw: &str) -> Result<String, AppError> {
    let parsed = Url::parse(raw).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "URL scheme must be http or https",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(AppError::bad_request(
            "URL must have a host",
            json!({ "url": raw }),
        ));
    }

    Ok(parsed.into())
}
