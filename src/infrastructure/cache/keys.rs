//! Cache key layout for the cache regions.
//!
//! Two link-keyed regions with independent TTLs and invalidation rules:
//! `link:{code}:static` for near-immutable metadata and `link:{code}:stats`
//! for usage counters. Permission decisions live under a project-scoped
//! prefix so a membership change can invalidate them with one prefix sweep.

use uuid::Uuid;

/// Static region: near-immutable link fields, JSON-encoded.
pub fn static_key(code: &str) -> String {
    format!("link:{}:static", code)
}

/// Dynamic region: hash with `clicks` and `last_clicked_at` fields.
pub fn stats_key(code: &str) -> String {
    format!("link:{}:stats", code)
}

/// Field names inside the dynamic-region hash.
pub const STATS_CLICKS_FIELD: &str = "clicks";
pub const STATS_LAST_CLICKED_FIELD: &str = "last_clicked_at";

/// Permission decision for one (link, requester, action-class) triple.
pub fn acl_key(project_id: i64, link_id: i64, requester: Option<Uuid>, class: &str) -> String {
    match requester {
        Some(user) => format!("acl:{}:{}:{}:{}", project_id, link_id, user, class),
        None => format!("acl:{}:{}:anon:{}", project_id, link_id, class),
    }
}

/// Permission decision for creating links inside a project. Lives under the
/// project prefix so membership sweeps cover it too.
pub fn acl_create_key(project_id: i64, requester: Uuid) -> String {
    format!("acl:{}:project:{}:create", project_id, requester)
}

/// Prefix covering every cached decision in a project. Deleted wholesale on
/// membership or ownership changes.
pub fn acl_project_prefix(project_id: i64) -> String {
    format!("acl:{}:", project_id)
}

/// Prefix covering the cached decisions for a single link.
pub fn acl_link_prefix(project_id: i64, link_id: i64) -> String {
    format!("acl:{}:{}:", project_id, link_id)
}

/// Popular-links rollup, keyed by requested size.
pub fn popular_key(limit: i64) -> String {
    format!("popular:{}", limit)
}

pub const POPULAR_PREFIX: &str = "popular:";
