//! Application services orchestrating the stores and cache regions.

pub mod access_policy;
pub mod link_service;
pub mod project_service;
pub mod resolution;
pub mod sweeper;

pub use access_policy::{AccessPolicy, Action, Decision, LinkAccess};
pub use link_service::{CreateLink, LinkService};
pub use project_service::ProjectService;
pub use resolution::{LinkStats, ResolutionEngine};
pub use sweeper::{SweepOutcome, Sweeper};
