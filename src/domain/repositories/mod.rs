//! Store traits abstracting durable persistence.

mod link_store;
mod project_store;

pub use link_store::{LinkStore, SearchScope};
pub use project_store::ProjectStore;

#[cfg(test)]
pub use link_store::MockLinkStore;
#[cfg(test)]
pub use project_store::MockProjectStore;
