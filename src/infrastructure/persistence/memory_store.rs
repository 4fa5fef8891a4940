//! In-memory store implementations.
//!
//! Interchangeable with the PostgreSQL stores behind the same traits; used by
//! the integration test suite and useful for local experiments without a
//! database. All mutations are atomic under a mutex, matching the
//! conditional-update semantics the engine relies on from Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink, NewProject, Project, ProjectMember};
use crate::domain::repositories::{LinkStore, ProjectStore, SearchScope};
use crate::error::AppError;

const PUBLIC_PROJECT_NAME: &str = "Public";
const PUBLIC_PROJECT_LIFETIME_DAYS: i32 = 5;

#[derive(Default)]
struct LinkTable {
    by_code: HashMap<String, Link>,
    next_id: i64,
}

/// In-memory [`LinkStore`].
#[derive(Default)]
pub struct MemoryLinkStore {
    table: Mutex<LinkTable>,
    /// Membership view used to resolve [`SearchScope::Visible`]; shared with
    /// the paired project store in tests via [`MemoryProjectStore::members`].
    memberships: Mutex<Vec<ProjectMember>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors a membership row so scoped search sees project links.
    pub fn grant_membership(&self, member: ProjectMember) {
        self.memberships
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(member);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinkTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_member(&self, project_id: i64, user_id: Uuid) -> bool {
        self.memberships
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut table = self.lock();

        if table.by_code.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "code": new_link.short_code }),
            ));
        }

        table.next_id += 1;
        let link = Link {
            id: table.next_id,
            short_code: new_link.short_code.clone(),
            original_url: new_link.original_url,
            project_id: new_link.project_id,
            owner_id: new_link.owner_id,
            is_public: new_link.is_public,
            created_at: Utc::now(),
            expires_at: new_link.expires_at,
            clicks_count: 0,
            last_clicked_at: None,
        };
        table.by_code.insert(new_link.short_code, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.lock().by_code.get(code).cloned())
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let mut table = self.lock();
        let link = table.by_code.get_mut(code).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        if let Some(url) = patch.original_url {
            link.original_url = url;
        }
        if let Some(is_public) = patch.is_public {
            link.is_public = is_public;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }

        Ok(link.clone())
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.lock().by_code.remove(code).is_some())
    }

    async fn increment_clicks(
        &self,
        code: &str,
        delta: i64,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut table = self.lock();
        match table.by_code.get_mut(code) {
            Some(link) => {
                link.clicks_count += delta;
                link.last_clicked_at = Some(match link.last_clicked_at {
                    Some(prev) if prev > clicked_at => prev,
                    _ => clicked_at,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Link>, AppError> {
        Ok(self
            .lock()
            .by_code
            .values()
            .filter(|l| l.is_expired_at(as_of))
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        url_fragment: &str,
        scope: SearchScope,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let table = self.lock();
        let mut hits: Vec<Link> = table
            .by_code
            .values()
            .filter(|l| l.original_url.contains(url_fragment))
            .filter(|l| match scope {
                SearchScope::Public => l.is_public,
                SearchScope::Visible(user) => {
                    l.is_public
                        || l.owner_id == Some(user)
                        || self.is_member(l.project_id, user)
                }
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn top_by_clicks(
        &self,
        limit: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .lock()
            .by_code
            .values()
            .filter(|l| l.is_public && !l.is_expired_at(as_of))
            .cloned()
            .collect();

        links.sort_by(|a, b| b.clicks_count.cmp(&a.clicks_count));
        links.truncate(limit as usize);
        Ok(links)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .lock()
            .by_code
            .values()
            .filter(|l| l.owner_id == Some(owner_id))
            .cloned()
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_for_project(
        &self,
        project_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .lock()
            .by_code
            .values()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[derive(Default)]
struct ProjectTable {
    projects: HashMap<i64, Project>,
    members: Vec<ProjectMember>,
    next_id: i64,
}

/// In-memory [`ProjectStore`].
#[derive(Default)]
pub struct MemoryProjectStore {
    table: Mutex<ProjectTable>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProjectTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, new_project: NewProject, owner_id: Uuid) -> Result<Project, AppError> {
        let mut table = self.lock();
        table.next_id += 1;
        let project = Project {
            id: table.next_id,
            name: new_project.name,
            default_link_lifetime_days: new_project.default_link_lifetime_days,
            owner_id: Some(owner_id),
            is_public: false,
            created_at: Utc::now(),
        };
        table.projects.insert(project.id, project.clone());
        table.members.push(ProjectMember {
            project_id: project.id,
            user_id: owner_id,
            is_admin: true,
        });

        Ok(project)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, AppError> {
        Ok(self.lock().projects.get(&id).cloned())
    }

    async fn get_or_create_public(&self) -> Result<Project, AppError> {
        let mut table = self.lock();
        if let Some(project) = table.projects.values().find(|p| p.is_public) {
            return Ok(project.clone());
        }

        table.next_id += 1;
        let project = Project {
            id: table.next_id,
            name: PUBLIC_PROJECT_NAME.to_string(),
            default_link_lifetime_days: PUBLIC_PROJECT_LIFETIME_DAYS,
            owner_id: None,
            is_public: true,
            created_at: Utc::now(),
        };
        table.projects.insert(project.id, project.clone());

        Ok(project)
    }

    async fn membership(
        &self,
        project_id: i64,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, AppError> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .copied())
    }

    async fn upsert_member(&self, member: ProjectMember) -> Result<(), AppError> {
        let mut table = self.lock();
        if let Some(existing) = table
            .members
            .iter_mut()
            .find(|m| m.project_id == member.project_id && m.user_id == member.user_id)
        {
            existing.is_admin = member.is_admin;
        } else {
            table.members.push(member);
        }
        Ok(())
    }

    async fn remove_member(&self, project_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let mut table = self.lock();
        let before = table.members.len();
        table
            .members
            .retain(|m| !(m.project_id == project_id && m.user_id == user_id));
        Ok(table.members.len() < before)
    }

    async fn admin_count(&self, project_id: i64) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .members
            .iter()
            .filter(|m| m.project_id == project_id && m.is_admin)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_duplicate_code() {
        let store = MemoryLinkStore::new();
        let new_link = NewLink {
            short_code: "dup".to_string(),
            original_url: "https://example.com".to_string(),
            project_id: 1,
            owner_id: None,
            is_public: true,
            expires_at: None,
        };

        store.create(new_link.clone()).await.unwrap();
        let err = store.create(new_link).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_increment_is_monotonic() {
        let store = MemoryLinkStore::new();
        store
            .create(NewLink {
                short_code: "abc".to_string(),
                original_url: "https://example.com".to_string(),
                project_id: 1,
                owner_id: None,
                is_public: true,
                expires_at: None,
            })
            .await
            .unwrap();

        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(30);

        // Out-of-order reconciliation must not move the timestamp backwards.
        store.increment_clicks("abc", 1, later).await.unwrap();
        store.increment_clicks("abc", 1, earlier).await.unwrap();

        let link = store.find_by_code("abc").await.unwrap().unwrap();
        assert_eq!(link.clicks_count, 2);
        assert_eq!(link.last_clicked_at, Some(later));
    }

    #[tokio::test]
    async fn test_search_sees_project_links_through_membership() {
        let store = MemoryLinkStore::new();
        let user = Uuid::new_v4();
        store
            .create(NewLink {
                short_code: "team".to_string(),
                original_url: "https://example.com/wiki".to_string(),
                project_id: 7,
                owner_id: None,
                is_public: false,
                expires_at: None,
            })
            .await
            .unwrap();

        let before = store
            .search("wiki", SearchScope::Visible(user), 10)
            .await
            .unwrap();
        assert!(before.is_empty());

        store.grant_membership(ProjectMember {
            project_id: 7,
            user_id: user,
            is_admin: false,
        });

        let after = store
            .search("wiki", SearchScope::Visible(user), 10)
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_public_project_created_once() {
        let store = MemoryProjectStore::new();
        let a = store.get_or_create_public().await.unwrap();
        let b = store.get_or_create_public().await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.default_link_lifetime_days, 5);
        assert!(a.owner_id.is_none());
    }

    #[tokio::test]
    async fn test_project_creator_becomes_admin() {
        let store = MemoryProjectStore::new();
        let owner = Uuid::new_v4();
        let project = store
            .create(
                NewProject {
                    name: "team".to_string(),
                    default_link_lifetime_days: 30,
                },
                owner,
            )
            .await
            .unwrap();

        let member = store.membership(project.id, owner).await.unwrap().unwrap();
        assert!(member.is_admin);
        assert_eq!(store.admin_count(project.id).await.unwrap(), 1);
    }
}
