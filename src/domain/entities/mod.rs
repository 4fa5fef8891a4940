//! Core business entities.

mod link;
mod project;

pub use link::{Link, LinkPatch, NewLink, UsageSnapshot};
pub use project::{NewProject, Project, ProjectMember};
