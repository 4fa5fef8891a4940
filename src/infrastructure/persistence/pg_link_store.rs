//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkStore, SearchScope};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_code, original_url, project_id, owner_id, is_public, \
     created_at, expires_at, clicks_count, last_clicked_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    project_id: i64,
    owner_id: Option<Uuid>,
    is_public: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    clicks_count: i64,
    last_clicked_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            short_code: row.short_code,
            original_url: row.original_url,
            project_id: row.project_id,
            owner_id: row.owner_id,
            is_public: row.is_public,
            created_at: row.created_at,
            expires_at: row.expires_at,
            clicks_count: row.clicks_count,
            last_clicked_at: row.last_clicked_at,
        }
    }
}

/// PostgreSQL store for links.
///
/// Counter writes use conditional `UPDATE ... + delta` statements so
/// concurrent writers never lose increments.
pub struct PgLinkStore {
    pool: Arc<PgPool>,
}

impl PgLinkStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (short_code, original_url, project_id, owner_id, is_public, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {LINK_COLUMNS}"
        );

        let row: LinkRow = sqlx::query_as(&sql)
            .bind(&new_link.short_code)
            .bind(&new_link.original_url)
            .bind(new_link.project_id)
            .bind(new_link.owner_id)
            .bind(new_link.is_public)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1");

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET \
                 original_url = COALESCE($2, original_url), \
                 is_public = COALESCE($3, is_public), \
                 expires_at = CASE WHEN $4 THEN $5 ELSE expires_at END \
             WHERE short_code = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .bind(patch.original_url)
            .bind(patch.is_public)
            .bind(patch.expires_at.is_some())
            .bind(patch.expires_at.flatten())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE short_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_clicks(
        &self,
        code: &str,
        delta: i64,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // GREATEST keeps last_clicked_at monotonic under out-of-order
        // reconciliation.
        let result = sqlx::query(
            "UPDATE links SET \
                 clicks_count = clicks_count + $2, \
                 last_clicked_at = GREATEST(COALESCE(last_clicked_at, $3), $3) \
             WHERE short_code = $1",
        )
        .bind(code)
        .bind(delta)
        .bind(clicked_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE expires_at IS NOT NULL AND expires_at <= $1"
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(as_of)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(
        &self,
        url_fragment: &str,
        scope: SearchScope,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let pattern = format!("%{}%", url_fragment.replace('%', "\\%").replace('_', "\\_"));

        let rows: Vec<LinkRow> = match scope {
            SearchScope::Public => {
                let sql = format!(
                    "SELECT {LINK_COLUMNS} FROM links \
                     WHERE original_url ILIKE $1 AND is_public \
                     ORDER BY created_at DESC LIMIT $2"
                );
                sqlx::query_as(&sql)
                    .bind(&pattern)
                    .bind(limit)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
            SearchScope::Visible(user_id) => {
                let sql = format!(
                    "SELECT DISTINCT ON (l.id) {cols} FROM links l \
                     LEFT JOIN project_members pm \
                        ON pm.project_id = l.project_id AND pm.user_id = $2 \
                     WHERE l.original_url ILIKE $1 \
                       AND (l.owner_id = $2 OR l.is_public OR pm.user_id IS NOT NULL) \
                     ORDER BY l.id, l.created_at DESC LIMIT $3",
                    cols = "l.id, l.short_code, l.original_url, l.project_id, l.owner_id, \
                            l.is_public, l.created_at, l.expires_at, l.clicks_count, \
                            l.last_clicked_at"
                );
                sqlx::query_as(&sql)
                    .bind(&pattern)
                    .bind(user_id)
                    .bind(limit)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn top_by_clicks(
        &self,
        limit: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE is_public AND (expires_at IS NULL OR expires_at > $2) \
             ORDER BY clicks_count DESC LIMIT $1"
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(as_of)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_project(
        &self,
        project_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE project_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
