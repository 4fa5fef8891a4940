//! Store implementations behind the domain store traits.

mod memory_store;
mod pg_link_store;
mod pg_project_store;

pub use memory_store::{MemoryLinkStore, MemoryProjectStore};
pub use pg_link_store::PgLinkStore;
pub use pg_project_store::PgProjectStore;
