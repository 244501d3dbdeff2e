//! Tag API endpoints

use api_types::{
    pagination::{ListQuery, ListResponse},
    tag::{TagNew, TagView},
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};

use crate::{
    ServerError,
    extract::{ApiJson, OrganizationId, page_request, pagination},
    server::ServerState,
};

pub(crate) fn tag_view(tag: engine::Tag) -> TagView {
    TagView {
        id: tag.id,
        organization_id: tag.organization_id,
        name: tag.name,
        created_at: tag.created_at.fixed_offset(),
        updated_at: tag.updated_at.fixed_offset(),
    }
}

/// Handle requests for creating a new tag
pub async fn create(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TagNew>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let tag = state.engine.create_tag(organization_id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(tag_view(tag))))
}

pub async fn list(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse<TagView>>, ServerError> {
    let Query(query) = query?;
    let page = state
        .engine
        .list_tags(organization_id, page_request(&query))
        .await?;

    let pagination = pagination(&page);
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(tag_view).collect(),
        pagination,
    }))
}
