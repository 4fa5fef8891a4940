//! Store trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Visibility scope for URL search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Public links only (anonymous requester).
    Public,
    /// Links the user owns, public links, and links in the user's projects.
    Visible(Uuid),
}

/// Durable store for short links. The sole system of record; every cache
/// region must be reconstructible from it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkStore`] - in-process,
///   used by the integration test suite
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code, including logically expired ones.
    /// Expiry policy is the caller's concern.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Partially updates a link. Only fields present in [`LinkPatch`] change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `code`.
    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError>;

    /// Deletes a link. Returns `Ok(false)` if it was already gone, which
    /// keeps sweeper cycles idempotent.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically adds `delta` to the click counter and advances
    /// `last_clicked_at` (never backwards). Returns `Ok(false)` if the link
    /// no longer exists.
    ///
    /// This is the conditional-update reconciliation point: concurrent
    /// writers must never lose increments.
    async fn increment_clicks(
        &self,
        code: &str,
        delta: i64,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Lists links whose `expires_at` has passed as of `as_of`.
    async fn list_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Link>, AppError>;

    /// Searches links by original-URL fragment within the given scope.
    async fn search(
        &self,
        url_fragment: &str,
        scope: SearchScope,
        limit: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Top unexpired public links ranked by click count.
    async fn top_by_clicks(&self, limit: i64, as_of: DateTime<Utc>)
    -> Result<Vec<Link>, AppError>;

    /// Lists a user's own links, newest first.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Lists a project's links, newest first.
    async fn list_for_project(
        &self,
        project_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;
}
