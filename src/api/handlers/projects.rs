//! Handlers for project and membership management.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::{
    CreateProjectRequest, LinkListResponse, LinkResponse, MemberRequest, PageQuery,
    ProjectResponse,
};
use crate::api::extract::Requester;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a project owned by the requester.
///
/// # Endpoint
///
/// `POST /api/projects`
pub async fn create_project_handler(
    State(state): State<AppState>,
    requester: Requester,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    payload.validate()?;
    let owner = requester.require()?;

    let project = state
        .project_service
        .create_project(&payload.name, payload.default_link_lifetime_days, owner)
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// Adds a member to a project or changes their admin flag. Admin-only.
///
/// # Endpoint
///
/// `PUT /api/projects/{id}/members`
///
/// Widening access takes effect immediately: the project's cached
/// permission decisions are swept as part of the change.
pub async fn add_member_handler(
    Path(project_id): Path<i64>,
    State(state): State<AppState>,
    requester: Requester,
    Json(payload): Json<MemberRequest>,
) -> Result<StatusCode, AppError> {
    let actor = requester.require()?;

    state
        .project_service
        .add_member(project_id, actor, payload.user_id, payload.is_admin)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes a member from a project. Admin-only; the last admin stays.
///
/// # Endpoint
///
/// `DELETE /api/projects/{id}/members/{user_id}`
pub async fn remove_member_handler(
    Path((project_id, user_id)): Path<(i64, Uuid)>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<StatusCode, AppError> {
    let actor = requester.require()?;

    state
        .project_service
        .remove_member(project_id, actor, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists a project's links for one of its members.
///
/// # Endpoint
///
/// `GET /api/projects/{id}/links?limit=<n>&offset=<n>`
pub async fn project_links_handler(
    Path(project_id): Path<i64>,
    Query(page): Query<PageQuery>,
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state
        .link_service
        .links_for_project(project_id, requester.user_id(), page.limit, page.offset)
        .await?;

    Ok(Json(LinkListResponse {
        links: links
            .iter()
            .map(|link| LinkResponse::from_link(link, state.short_url(&link.short_code)))
            .collect(),
    }))
}
