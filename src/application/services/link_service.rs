//! Link lifecycle: creation, updates, deletion, search and listings.
//!
//! Every write path here owns the cache invalidation for the state it
//! changes. Static link metadata and cached permissions are dropped
//! explicitly; only the popular rollups are allowed to age out on TTL alone,
//! except when a link disappears entirely.

use crate::application::cache_model::PopularEntry;
use crate::application::services::access_policy::{AccessPolicy, Action, Decision, LinkAccess};
use crate::config::CacheTtls;
use crate::domain::entities::{Link, LinkPatch, NewLink, Project};
use crate::domain::repositories::{LinkStore, ProjectStore, SearchScope};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, keys};
use crate::utils::code_generator::{generate_code, validate_custom_alias};
use crate::utils::url_normalizer::normalize_url;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Collision-retry budget for generated codes.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Shortest accepted expiry horizon.
const MIN_EXPIRY_MINUTES: i64 = 5;

/// Shortest accepted search fragment.
const MIN_SEARCH_FRAGMENT: usize = 3;

const MAX_PAGE_SIZE: i64 = 100;
const MAX_POPULAR_LIMIT: i64 = 50;

/// Input for creating a link.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub project_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
}

/// Orchestrates link writes, search and listings over the stores and cache.
pub struct LinkService {
    links: Arc<dyn LinkStore>,
    projects: Arc<dyn ProjectStore>,
    cache: Arc<dyn CacheService>,
    policy: Arc<AccessPolicy>,
    ttls: CacheTtls,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkStore>,
        projects: Arc<dyn ProjectStore>,
        cache: Arc<dyn CacheService>,
        policy: Arc<AccessPolicy>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            links,
            projects,
            cache,
            policy,
            ttls,
        }
    }

    /// Creates a short link.
    ///
    /// Anonymous requests land in the public project: the link is forced
    /// public, has no owner, and its lifetime is clamped to the project's
    /// ceiling. Authenticated requests may target any project the requester
    /// can create in; missing expiry defaults to the project's lifetime.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for bad URLs, aliases or expiry times
    /// - [`AppError::Forbidden`] when the requester cannot create in the
    ///   target project
    /// - [`AppError::Conflict`] when a custom alias is taken
    /// - [`AppError::CodeExhausted`] when code generation keeps colliding
    pub async fn create_link(
        &self,
        req: CreateLink,
        requester: Option<Uuid>,
    ) -> Result<Link, AppError> {
        let original_url = normalize_url(&req.original_url)?;
        let now = Utc::now();
        let public_project = self.projects.get_or_create_public().await?;

        let (project, owner_id, is_public, requested_expiry) = match requester {
            None => {
                let ceiling =
                    now + Duration::days(public_project.default_link_lifetime_days as i64);
                let expiry = match req.expires_at {
                    Some(t) if t < ceiling => Some(t),
                    _ => Some(ceiling),
                };
                (public_project, None, true, expiry)
            }
            Some(user) => {
                let project = match req.project_id {
                    None => public_project,
                    Some(id) if id == public_project.id => public_project,
                    Some(id) => {
                        let project = self.projects.find_by_id(id).await?.ok_or_else(|| {
                            AppError::not_found("Project not found", json!({ "project_id": id }))
                        })?;
                        let decision = self.policy.authorize_create(&project, requester).await?;
                        if decision == Decision::Deny {
                            return Err(AppError::forbidden(
                                "Not a member of this project",
                                json!({ "project_id": id }),
                            ));
                        }
                        project
                    }
                };
                (project, Some(user), req.is_public.unwrap_or(true), req.expires_at)
            }
        };

        let expires_at = self.resolve_expiry(requested_expiry, &project, now)?;
        let short_code = match &req.custom_alias {
            Some(alias) => {
                validate_custom_alias(alias)?;
                if self.links.find_by_code(alias).await?.is_some() {
                    return Err(AppError::conflict(
                        "This alias is already taken",
                        json!({ "alias": alias }),
                    ));
                }
                alias.clone()
            }
            None => self.free_code().await?,
        };

        self.links
            .create(NewLink {
                short_code,
                original_url,
                project_id: project.id,
                owner_id,
                is_public,
                expires_at,
            })
            .await
    }

    fn resolve_expiry(
        &self,
        requested: Option<DateTime<Utc>>,
        project: &Project,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        match requested {
            None => Ok(Some(
                now + Duration::days(project.default_link_lifetime_days as i64),
            )),
            Some(t) => {
                if t < now + Duration::minutes(MIN_EXPIRY_MINUTES) {
                    return Err(AppError::bad_request(
                        format!(
                            "Expiry must be at least {} minutes in the future",
                            MIN_EXPIRY_MINUTES
                        ),
                        json!({ "expires_at": t }),
                    ));
                }
                Ok(Some(t))
            }
        }
    }

    async fn free_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = generate_code();
            if self.links.find_by_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(AppError::code_exhausted(
            "Could not generate a unique short code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    /// Partially updates a link and invalidates its cached state.
    ///
    /// Visibility and URL changes must take effect immediately: the static
    /// cache entry and the link's cached permissions are dropped, never left
    /// to age out.
    pub async fn update_link(
        &self,
        code: &str,
        mut patch: LinkPatch,
        requester: Option<Uuid>,
    ) -> Result<Link, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request("No fields to update", json!({})));
        }

        let link = self.require_writable(code, requester).await?;

        if let Some(url) = patch.original_url.take() {
            patch.original_url = Some(normalize_url(&url)?);
        }
        if let Some(Some(t)) = patch.expires_at
            && t < Utc::now() + Duration::minutes(MIN_EXPIRY_MINUTES)
        {
            return Err(AppError::bad_request(
                format!(
                    "Expiry must be at least {} minutes in the future",
                    MIN_EXPIRY_MINUTES
                ),
                json!({ "expires_at": t }),
            ));
        }

        let updated = self.links.update(code, patch).await?;
        self.invalidate_link_state(&link, false).await;
        Ok(updated)
    }

    /// Deletes a link and drops every cache region that mentions it.
    pub async fn delete_link(&self, code: &str, requester: Option<Uuid>) -> Result<(), AppError> {
        let link = self.require_writable(code, requester).await?;

        self.links.delete(code).await?;
        self.invalidate_link_state(&link, true).await;
        // rollups may still rank the deleted link
        let _ = self.cache.delete_by_prefix(keys::POPULAR_PREFIX).await;
        Ok(())
    }

    async fn require_writable(
        &self,
        code: &str,
        requester: Option<Uuid>,
    ) -> Result<Link, AppError> {
        let link = self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_code": code }))
        })?;
        if link.is_expired() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "short_code": code }),
            ));
        }

        let decision = self
            .policy
            .authorize(LinkAccess::from(&link), requester, Action::Write)
            .await?;
        if decision == Decision::Deny {
            return Err(AppError::forbidden(
                "Only the link creator or a project admin may modify this link",
                json!({ "short_code": code }),
            ));
        }
        Ok(link)
    }

    async fn invalidate_link_state(&self, link: &Link, drop_stats: bool) {
        let _ = self.cache.delete(&keys::static_key(&link.short_code)).await;
        if drop_stats {
            let _ = self.cache.delete(&keys::stats_key(&link.short_code)).await;
        }
        self.policy.invalidate_link(link.project_id, link.id).await;
    }

    /// Searches links by original-URL fragment within the requester's
    /// visibility scope.
    pub async fn search(
        &self,
        fragment: &str,
        requester: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let fragment = fragment.trim();
        if fragment.len() < MIN_SEARCH_FRAGMENT {
            return Err(AppError::bad_request(
                format!(
                    "Search fragment must be at least {} characters",
                    MIN_SEARCH_FRAGMENT
                ),
                json!({ "fragment": fragment }),
            ));
        }

        let scope = match requester {
            None => SearchScope::Public,
            Some(user) => SearchScope::Visible(user),
        };
        self.links
            .search(fragment, scope, limit.clamp(1, MAX_PAGE_SIZE))
            .await
    }

    /// Most-clicked public links, served from a TTL-bounded rollup.
    pub async fn popular(&self, limit: i64) -> Result<Vec<PopularEntry>, AppError> {
        let limit = limit.clamp(1, MAX_POPULAR_LIMIT);
        let key = keys::popular_key(limit);

        if let Ok(Some(raw)) = self.cache.get(&key).await
            && let Ok(entries) = serde_json::from_str::<Vec<PopularEntry>>(&raw)
        {
            return Ok(entries);
        }

        let links = self.links.top_by_clicks(limit, Utc::now()).await?;
        let entries: Vec<PopularEntry> = links.iter().map(PopularEntry::from).collect();
        if let Ok(encoded) = serde_json::to_string(&entries) {
            let _ = self.cache.set(&key, &encoded, self.ttls.popular).await;
        }
        Ok(entries)
    }

    /// Lists the requester's own links, newest first.
    pub async fn links_for_user(
        &self,
        user: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        self.links
            .list_for_owner(user, limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }

    /// Lists a project's links for one of its members.
    pub async fn links_for_project(
        &self,
        project_id: i64,
        requester: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let project = self.projects.find_by_id(project_id).await?.ok_or_else(|| {
            AppError::not_found("Project not found", json!({ "project_id": project_id }))
        })?;

        let Some(user) = requester else {
            return Err(AppError::forbidden(
                "Project membership required",
                json!({ "project_id": project_id }),
            ));
        };
        let allowed = project.is_owned_by(user)
            || self.projects.membership(project_id, user).await?.is_some();
        if !allowed {
            return Err(AppError::forbidden(
                "Project membership required",
                json!({ "project_id": project_id }),
            ));
        }

        self.links
            .list_for_project(project_id, limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }
}
