//! HTTP request handlers.

pub mod health;
pub mod links;
pub mod projects;
pub mod redirect;
pub mod shorten;
pub mod stats;

pub use health::health_handler;
pub use links::{
    delete_link_handler, my_links_handler, popular_handler, search_handler, update_link_handler,
};
pub use projects::{
    add_member_handler, create_project_handler, project_links_handler, remove_member_handler,
};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::stats_handler;
