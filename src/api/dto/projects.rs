//! DTOs for project and membership management.

use crate::domain::entities::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_lifetime_days() -> i32 {
    30
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Default lifetime applied to links created without an expiry.
    #[serde(default = "default_lifetime_days")]
    pub default_link_lifetime_days: i32,
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub default_link_lifetime_days: i32,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            default_link_lifetime_days: project.default_link_lifetime_days,
            owner_id: project.owner_id,
            is_public: project.is_public,
            created_at: project.created_at,
        }
    }
}
