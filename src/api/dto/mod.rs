//! Request and response types for the HTTP API.

pub mod health;
pub mod link;
pub mod projects;
pub mod queries;
pub mod shorten;
pub mod stats;
pub mod update_link;

pub use health::HealthResponse;
pub use link::{LinkListResponse, LinkResponse, PopularLinkResponse};
pub use projects::{CreateProjectRequest, MemberRequest, ProjectResponse};
pub use queries::{PageQuery, PopularQuery, SearchQuery};
pub use shorten::ShortenRequest;
pub use stats::StatsResponse;
pub use update_link::UpdateLinkRequest;
