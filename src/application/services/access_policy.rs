//! Cache-assisted permission evaluation.
//!
//! Decisions derive from project membership and link visibility, and are
//! cached per (project, link, requester, action class) with a short TTL.
//! Paths that change the inputs (membership changes, link updates) must
//! invalidate the matching prefix instead of waiting the TTL out.

use crate::application::cache_model::CachedLink;
use crate::domain::entities::{Link, Project};
use crate::domain::repositories::ProjectStore;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// What the requester is trying to do with a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Follow the redirect.
    ReadRedirect,
    /// Read usage statistics.
    ReadStats,
    /// Modify or delete the link.
    Write,
}

impl Action {
    /// Both reads share one rule, so they share one cached decision.
    fn class(self) -> &'static str {
        match self {
            Action::ReadRedirect | Action::ReadStats => "read",
            Action::Write => "write",
        }
    }
}

/// Outcome of a permission check. Denials carry no reason: the caller decides
/// how much to reveal (redirect paths mask them entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    fn encode(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw {
            "allow" => Some(Decision::Allow),
            "deny" => Some(Decision::Deny),
            _ => None,
        }
    }
}

/// The link fields a permission check needs, detached from where the link
/// came from (store row or static cache entry).
#[derive(Debug, Clone, Copy)]
pub struct LinkAccess {
    pub link_id: i64,
    pub project_id: i64,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
}

impl From<&Link> for LinkAccess {
    fn from(link: &Link) -> Self {
        Self {
            link_id: link.id,
            project_id: link.project_id,
            owner_id: link.owner_id,
            is_public: link.is_public,
        }
    }
}

impl From<&CachedLink> for LinkAccess {
    fn from(view: &CachedLink) -> Self {
        Self {
            link_id: view.id,
            project_id: view.project_id,
            owner_id: view.owner_id,
            is_public: view.is_public,
        }
    }
}

/// Evaluates link and project permissions against the membership store,
/// caching non-trivial decisions.
pub struct AccessPolicy {
    projects: Arc<dyn ProjectStore>,
    cache: Arc<dyn CacheService>,
    acl_ttl: Duration,
}

impl AccessPolicy {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        cache: Arc<dyn CacheService>,
        acl_ttl: Duration,
    ) -> Self {
        Self {
            projects,
            cache,
            acl_ttl,
        }
    }

    /// Decides whether `requester` may perform `action` on a link.
    ///
    /// Rules:
    /// - read: the link is public, or the requester created it, or the
    ///   requester belongs to its project
    /// - write: the requester created it, or is an admin of its project
    ///
    /// Anonymous requesters can only read public links. Fast paths that need
    /// no membership lookup (public link, link creator) are not cached.
    pub async fn authorize(
        &self,
        link: LinkAccess,
        requester: Option<Uuid>,
        action: Action,
    ) -> Result<Decision, AppError> {
        if link.is_public && matches!(action, Action::ReadRedirect | Action::ReadStats) {
            return Ok(Decision::Allow);
        }

        let Some(user) = requester else {
            return Ok(Decision::Deny);
        };

        if link.owner_id == Some(user) {
            return Ok(Decision::Allow);
        }

        let key = keys::acl_key(link.project_id, link.link_id, Some(user), action.class());
        if let Ok(Some(raw)) = self.cache.get(&key).await
            && let Some(decision) = Decision::decode(&raw)
        {
            return Ok(decision);
        }

        let decision = self.evaluate_membership(link.project_id, user, action).await?;
        let _ = self.cache.set(&key, decision.encode(), self.acl_ttl).await;
        Ok(decision)
    }

    async fn evaluate_membership(
        &self,
        project_id: i64,
        user: Uuid,
        action: Action,
    ) -> Result<Decision, AppError> {
        let membership = self.projects.membership(project_id, user).await?;
        let owns_project = self
            .projects
            .find_by_id(project_id)
            .await?
            .is_some_and(|p| p.is_owned_by(user));

        let allowed = match action {
            Action::ReadRedirect | Action::ReadStats => owns_project || membership.is_some(),
            Action::Write => owns_project || membership.is_some_and(|m| m.is_admin),
        };

        Ok(if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        })
    }

    /// Decides whether `requester` may create links inside `project`.
    /// Anyone, including anonymous visitors, may use the public project.
    pub async fn authorize_create(
        &self,
        project: &Project,
        requester: Option<Uuid>,
    ) -> Result<Decision, AppError> {
        if project.is_public {
            return Ok(Decision::Allow);
        }

        let Some(user) = requester else {
            return Ok(Decision::Deny);
        };

        if project.is_owned_by(user) {
            return Ok(Decision::Allow);
        }

        let key = keys::acl_create_key(project.id, user);
        if let Ok(Some(raw)) = self.cache.get(&key).await
            && let Some(decision) = Decision::decode(&raw)
        {
            return Ok(decision);
        }

        let decision = if self.projects.membership(project.id, user).await?.is_some() {
            Decision::Allow
        } else {
            Decision::Deny
        };
        let _ = self.cache.set(&key, decision.encode(), self.acl_ttl).await;
        Ok(decision)
    }

    /// Drops every cached decision in a project. Must be called whenever
    /// membership or project ownership changes.
    pub async fn invalidate_project(&self, project_id: i64) {
        let prefix = keys::acl_project_prefix(project_id);
        if let Err(e) = self.cache.delete_by_prefix(&prefix).await {
            tracing::warn!(
                project_id,
                error = %e,
                "Failed to invalidate cached project permissions"
            );
        }
    }

    /// Drops the cached decisions for a single link. Called on link update
    /// and delete.
    pub async fn invalidate_link(&self, project_id: i64, link_id: i64) {
        let prefix = keys::acl_link_prefix(project_id, link_id);
        if let Err(e) = self.cache.delete_by_prefix(&prefix).await {
            tracing::warn!(
                project_id,
                link_id,
                error = %e,
                "Failed to invalidate cached link permissions"
            );
        }
    }
}
