//! PostgreSQL implementation of the project store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewProject, Project, ProjectMember};
use crate::domain::repositories::ProjectStore;
use crate::error::AppError;

/// Name given to the distinguished public project on first use.
const PUBLIC_PROJECT_NAME: &str = "Public";

/// Lifetime ceiling (days) stored on the public project when it is created.
const PUBLIC_PROJECT_LIFETIME_DAYS: i32 = 5;

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    default_link_lifetime_days: i32,
    owner_id: Option<Uuid>,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            default_link_lifetime_days: row.default_link_lifetime_days,
            owner_id: row.owner_id,
            is_public: row.is_public,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    project_id: i64,
    user_id: Uuid,
    is_admin: bool,
}

const PROJECT_COLUMNS: &str =
    "id, name, default_link_lifetime_days, owner_id, is_public, created_at";

/// PostgreSQL store for projects and memberships.
pub struct PgProjectStore {
    pool: Arc<PgPool>,
}

impl PgProjectStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create(&self, new_project: NewProject, owner_id: Uuid) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO projects (name, default_link_lifetime_days, owner_id) \
             VALUES ($1, $2, $3) RETURNING {PROJECT_COLUMNS}"
        );
        let row: ProjectRow = sqlx::query_as(&sql)
            .bind(&new_project.name)
            .bind(new_project.default_link_lifetime_days)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO project_members (project_id, user_id, is_admin) VALUES ($1, $2, TRUE)",
        )
        .bind(row.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        let row: Option<ProjectRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn get_or_create_public(&self) -> Result<Project, AppError> {
        let select = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE is_public LIMIT 1");

        if let Some(row) = sqlx::query_as::<_, ProjectRow>(&select)
            .fetch_optional(self.pool.as_ref())
            .await?
        {
            return Ok(row.into());
        }

        // Concurrent first calls race here; the partial unique index makes the
        // loser's insert a no-op and the reselect below settles it.
        sqlx::query(
            "INSERT INTO projects (name, default_link_lifetime_days, is_public) \
             VALUES ($1, $2, TRUE) ON CONFLICT DO NOTHING",
        )
        .bind(PUBLIC_PROJECT_NAME)
        .bind(PUBLIC_PROJECT_LIFETIME_DAYS)
        .execute(self.pool.as_ref())
        .await?;

        let row: ProjectRow = sqlx::query_as(&select).fetch_one(self.pool.as_ref()).await?;
        Ok(row.into())
    }

    async fn membership(
        &self,
        project_id: i64,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, AppError> {
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT project_id, user_id, is_admin FROM project_members \
             WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| ProjectMember {
            project_id: r.project_id,
            user_id: r.user_id,
            is_admin: r.is_admin,
        }))
    }

    async fn upsert_member(&self, member: ProjectMember) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id, is_admin) VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, user_id) DO UPDATE SET is_admin = EXCLUDED.is_admin",
        )
        .bind(member.project_id)
        .bind(member.user_id)
        .bind(member.is_admin)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn remove_member(&self, project_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn admin_count(&self, project_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM project_members WHERE project_id = $1 AND is_admin",
        )
        .bind(project_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
