//! Handlers for link updates, deletion, and listings.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use crate::api::dto::{
    LinkListResponse, LinkResponse, PageQuery, PopularLinkResponse, PopularQuery, SearchQuery,
    UpdateLinkRequest,
};
use crate::api::extract::Requester;
use crate::error::AppError;
use crate::state::AppState;

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
///
/// Only the link creator or a project admin may update. Unlike the read
/// paths this endpoint does not mask denials; it is already authenticated
/// territory.
///
/// # Errors
///
/// - 400 Bad Request - empty patch, invalid URL or expiry
/// - 403 Forbidden - requester may not modify this link
/// - 404 Not Found - unknown or expired code
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    requester: Requester,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(&code, payload.into(), requester.user_id())
        .await?;

    let short_url = state.short_url(&link.short_code);
    Ok(Json(LinkResponse::from_link(&link, short_url)))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Errors
///
/// - 403 Forbidden - requester may not delete this link
/// - 404 Not Found - unknown or expired code
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<StatusCode, AppError> {
    state
        .link_service
        .delete_link(&code, requester.user_id())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Searches links by original-URL fragment.
///
/// # Endpoint
///
/// `GET /api/links/search?q=<fragment>&limit=<n>`
///
/// Anonymous requesters search public links only; authenticated requesters
/// also see their own links and those of their projects.
pub async fn search_handler(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state
        .link_service
        .search(&query.q, requester.user_id(), query.limit)
        .await?;

    Ok(Json(to_list_response(&state, links)))
}

/// Most-clicked public links.
///
/// # Endpoint
///
/// `GET /api/links/popular?limit=<n>`
///
/// Served from a TTL-bounded rollup; counts may lag live counters.
pub async fn popular_handler(
    Query(query): Query<PopularQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PopularLinkResponse>>, AppError> {
    let entries = state.link_service.popular(query.limit).await?;

    let response = entries
        .iter()
        .map(|entry| PopularLinkResponse::from_entry(entry, state.short_url(&entry.short_code)))
        .collect();
    Ok(Json(response))
}

/// Lists the requester's own links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?limit=<n>&offset=<n>`
pub async fn my_links_handler(
    Query(page): Query<PageQuery>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<LinkListResponse>, AppError> {
    let user = requester.require()?;

    let links = state
        .link_service
        .links_for_user(user, page.limit, page.offset)
        .await?;

    Ok(Json(to_list_response(&state, links)))
}

fn to_list_response(
    state: &AppState,
    links: Vec<crate::domain::entities::Link>,
) -> LinkListResponse {
    LinkListResponse {
        links: links
            .iter()
            .map(|link| LinkResponse::from_link(link, state.short_url(&link.short_code)))
            .collect(),
    }
}
