//! Store trait for projects and memberships.

use crate::domain::entities::{NewProject, Project, ProjectMember};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Durable store for projects and their membership rows.
///
/// Cache invalidation for membership changes is owned by the project
/// service, not the store; these methods only touch rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Creates a project and its owner's admin membership.
    async fn create(&self, new_project: NewProject, owner_id: Uuid) -> Result<Project, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, AppError>;

    /// Returns the distinguished public project, creating it on first use.
    async fn get_or_create_public(&self) -> Result<Project, AppError>;

    /// Returns the membership row for a user in a project, if any.
    /// Project owners are implicit members and do not appear here.
    async fn membership(
        &self,
        project_id: i64,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, AppError>;

    /// Adds or updates a membership row.
    async fn upsert_member(&self, member: ProjectMember) -> Result<(), AppError>;

    /// Removes a membership row. Returns `Ok(false)` if it did not exist.
    async fn remove_member(&self, project_id: i64, user_id: Uuid) -> Result<bool, AppError>;

    /// Number of admin membership rows in a project, used by the
    /// last-admin guard.
    async fn admin_count(&self, project_id: i64) -> Result<i64, AppError>;
}
