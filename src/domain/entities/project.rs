//! Project and membership entities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A project grouping links under shared access rules.
///
/// Exactly one project has `is_public = true`; it holds anonymously created
/// links, carries the anonymous link-lifetime ceiling, and has no owner.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub default_link_lifetime_days: i32,
    pub owner_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub default_link_lifetime_days: i32,
}

/// Relates a user to a project.
///
/// Invariant: a project always keeps at least one admin. The guard lives in
/// the project service, not here.
#[derive(Debug, Clone, Copy)]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Project {
    /// Owner membership is implicit: the owner reads and administers the
    /// project without a `project_members` row.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_check() {
        let owner = Uuid::new_v4();
        let project = Project {
            id: 1,
            name: "team".to_string(),
            default_link_lifetime_days: 30,
            owner_id: Some(owner),
            is_public: false,
            created_at: Utc::now(),
        };
        assert!(project.is_owned_by(owner));
        assert!(!project.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_public_project_has_no_owner() {
        let project = Project {
            id: 1,
            name: "public".to_string(),
            default_link_lifetime_days: 5,
            owner_id: None,
            is_public: true,
            created_at: Utc::now(),
        };
        assert!(!project.is_owned_by(Uuid::new_v4()));
    }
}
