//! Project and membership management.
//!
//! Membership changes are the one write path that can widen or narrow access
//! to many links at once, so every mutation here ends with a project-wide
//! permission-cache sweep.

use crate::application::services::access_policy::AccessPolicy;
use crate::domain::entities::{NewProject, Project, ProjectMember};
use crate::domain::repositories::ProjectStore;
use crate::error::AppError;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 100;
const MAX_LIFETIME_DAYS: i32 = 3650;

pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
    policy: Arc<AccessPolicy>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectStore>, policy: Arc<AccessPolicy>) -> Self {
        Self { projects, policy }
    }

    /// Creates a project owned by `owner`, who becomes its first admin.
    pub async fn create_project(
        &self,
        name: &str,
        default_link_lifetime_days: i32,
        owner: Uuid,
    ) -> Result<Project, AppError> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(AppError::bad_request(
                format!("Project name must be 1-{} characters", MAX_NAME_LENGTH),
                json!({ "length": name.len() }),
            ));
        }
        if !(1..=MAX_LIFETIME_DAYS).contains(&default_link_lifetime_days) {
            return Err(AppError::bad_request(
                format!("Link lifetime must be 1-{} days", MAX_LIFETIME_DAYS),
                json!({ "days": default_link_lifetime_days }),
            ));
        }

        self.projects
            .create(
                NewProject {
                    name: name.to_string(),
                    default_link_lifetime_days,
                },
                owner,
            )
            .await
    }

    pub async fn get_project(&self, project_id: i64) -> Result<Project, AppError> {
        self.projects.find_by_id(project_id).await?.ok_or_else(|| {
            AppError::not_found("Project not found", json!({ "project_id": project_id }))
        })
    }

    /// Adds a member or changes their admin flag. Admin-only.
    pub async fn add_member(
        &self,
        project_id: i64,
        actor: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), AppError> {
        let project = self.require_admin(project_id, actor).await?;
        if project.is_public {
            return Err(AppError::conflict(
                "The public project has no members",
                json!({ "project_id": project_id }),
            ));
        }

        // demoting the only admin would orphan the project
        if !is_admin
            && let Some(existing) = self.projects.membership(project_id, user_id).await?
            && existing.is_admin
            && self.projects.admin_count(project_id).await? <= 1
        {
            return Err(AppError::conflict(
                "Cannot demote the last admin",
                json!({ "project_id": project_id }),
            ));
        }

        self.projects
            .upsert_member(ProjectMember {
                project_id,
                user_id,
                is_admin,
            })
            .await?;
        self.policy.invalidate_project(project_id).await;
        Ok(())
    }

    /// Removes a member. Admin-only, and the last admin cannot be removed.
    pub async fn remove_member(
        &self,
        project_id: i64,
        actor: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        self.require_admin(project_id, actor).await?;

        let member = self
            .projects
            .membership(project_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Membership not found",
                    json!({ "project_id": project_id, "user_id": user_id }),
                )
            })?;

        if member.is_admin && self.projects.admin_count(project_id).await? <= 1 {
            return Err(AppError::conflict(
                "Cannot remove the last admin",
                json!({ "project_id": project_id }),
            ));
        }

        self.projects.remove_member(project_id, user_id).await?;
        self.policy.invalidate_project(project_id).await;
        Ok(())
    }

    async fn require_admin(&self, project_id: i64, actor: Uuid) -> Result<Project, AppError> {
        let project = self.get_project(project_id).await?;
        let is_admin = project.is_owned_by(actor)
            || self
                .projects
                .membership(project_id, actor)
                .await?
                .is_some_and(|m| m.is_admin);
        if !is_admin {
            return Err(AppError::forbidden(
                "Project admin required",
                json!({ "project_id": project_id }),
            ));
        }
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::{CacheService, MemoryCache};
    use crate::infrastructure::cache::keys;
    use crate::infrastructure::persistence::MemoryProjectStore;
    use std::time::Duration;

    struct Fixture {
        projects: Arc<MemoryProjectStore>,
        cache: Arc<MemoryCache>,
        service: ProjectService,
    }

    fn fixture() -> Fixture {
        let projects = Arc::new(MemoryProjectStore::new());
        let cache = Arc::new(MemoryCache::new());
        let policy = Arc::new(AccessPolicy::new(
            projects.clone(),
            cache.clone(),
            Duration::from_secs(300),
        ));
        let service = ProjectService::new(projects.clone(), policy);
        Fixture {
            projects,
            cache,
            service,
        }
    }

    async fn team_project(fx: &Fixture, owner: Uuid) -> Project {
        fx.service.create_project("team", 30, owner).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_project_validates_inputs() {
        let fx = fixture();
        let owner = Uuid::new_v4();

        assert!(fx.service.create_project("", 30, owner).await.is_err());
        assert!(fx.service.create_project("team", 0, owner).await.is_err());
        assert!(
            fx.service
                .create_project("team", 10_000, owner)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_owner_can_add_member() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = team_project(&fx, owner).await;

        fx.service
            .add_member(project.id, owner, member, false)
            .await
            .unwrap();

        let row = fx.projects.membership(project.id, member).await.unwrap();
        assert!(row.is_some_and(|m| !m.is_admin));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_add_member() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = team_project(&fx, owner).await;
        fx.service
            .add_member(project.id, owner, member, false)
            .await
            .unwrap();

        let err = fx
            .service
            .add_member(project.id, member, Uuid::new_v4(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_removed() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let project = team_project(&fx, owner).await;

        // the owner's own admin row is the only one
        let err = fx
            .service
            .remove_member(project.id, owner, owner)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_admin_removal_allowed_when_another_admin_remains() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let second = Uuid::new_v4();
        let project = team_project(&fx, owner).await;
        fx.service
            .add_member(project.id, owner, second, true)
            .await
            .unwrap();

        fx.service
            .remove_member(project.id, owner, owner)
            .await
            .unwrap();

        assert!(
            fx.projects
                .membership(project.id, owner)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_membership_change_sweeps_cached_permissions() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = team_project(&fx, owner).await;

        // plant a cached decision under the project's prefix
        let key = keys::acl_key(project.id, 1, Some(member), "read");
        fx.cache
            .set(&key, "deny", Duration::from_secs(300))
            .await
            .unwrap();

        fx.service
            .add_member(project.id, owner, member, false)
            .await
            .unwrap();

        assert!(fx.cache.get(&key).await.unwrap().is_none());
    }
}
