//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /{code}`                               - Short link redirect
//! - `GET    /health`                               - Health check
//! - `POST   /api/links`                            - Create a short link
//! - `GET    /api/links`                            - List the requester's links
//! - `GET    /api/links/search`                     - Search links by URL fragment
//! - `GET    /api/links/popular`                    - Most-clicked public links
//! - `GET    /api/links/{code}/stats`               - Link statistics
//! - `PATCH  /api/links/{code}`                     - Update a link
//! - `DELETE /api/links/{code}`                     - Delete a link
//! - `POST   /api/projects`                         - Create a project
//! - `GET    /api/projects/{id}/links`              - List a project's links
//! - `PUT    /api/projects/{id}/members`            - Add or update a member
//! - `DELETE /api/projects/{id}/members/{user_id}`  - Remove a member
//!
//! Requester identity comes from the `X-User-Id` header set by the fronting
//! gateway; endpoints decide per-route how anonymous requests are treated.

use crate::api::handlers::{
    add_member_handler, create_project_handler, delete_link_handler, health_handler,
    my_links_handler, popular_handler, project_links_handler, redirect_handler,
    remove_member_handler, search_handler, shorten_handler, stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// The route table without the outer path-normalization layer. Used directly
/// by the integration tests.
pub fn router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/links", post(shorten_handler).get(my_links_handler))
        .route("/links/search", get(search_handler))
        .route("/links/popular", get(popular_handler))
        .route("/links/{code}/stats", get(stats_handler))
        .route(
            "/links/{code}",
            delete(delete_link_handler).patch(update_link_handler),
        )
        .route("/projects", post(create_project_handler))
        .route("/projects/{id}/links", get(project_links_handler))
        .route("/projects/{id}/members", put(add_member_handler))
        .route(
            "/projects/{id}/members/{user_id}",
            delete(remove_member_handler),
        );

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
