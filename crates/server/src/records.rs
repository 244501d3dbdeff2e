//! Financial record API endpoints

use api_types::{
    Direction as ApiDirection,
    pagination::{ListQuery, ListResponse},
    record::{RecordNew, RecordView},
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    ServerError,
    extract::{ApiJson, OrganizationId, page_request, pagination, tag_filter},
    server::ServerState,
    tags::tag_view,
};

fn map_direction(direction: engine::Direction) -> ApiDirection {
    match direction {
        engine::Direction::In => ApiDirection::In,
        engine::Direction::Out => ApiDirection::Out,
    }
}

fn new_record(payload: RecordNew) -> engine::NewRecord {
    engine::NewRecord {
        direction: payload.direction,
        amount: payload.amount,
        due_date: payload.due_date.with_timezone(&Utc),
        tag_ids: payload
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.id)
            .collect(),
    }
}

fn record_view(record: engine::FinancialRecord) -> RecordView {
    RecordView {
        id: record.id,
        organization_id: record.organization_id,
        direction: map_direction(record.direction),
        amount: record.amount.as_f64(),
        due_date: record.due_date.fixed_offset(),
        tags: record.tags.into_iter().map(tag_view).collect(),
        created_at: record.created_at.fixed_offset(),
        updated_at: record.updated_at.fixed_offset(),
    }
}

pub async fn create(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<RecordNew>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let record = state
        .engine
        .create_record(organization_id, new_record(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(record_view(record))))
}

/// Handle requests for creating many records at once
///
/// Either every record is stored or none is.
pub async fn create_bulk(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<Vec<RecordNew>>,
) -> Result<(StatusCode, Json<Vec<RecordView>>), ServerError> {
    let records = payload.into_iter().map(new_record).collect();
    let created = state
        .engine
        .create_records_bulk(organization_id, records)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(record_view).collect()),
    ))
}

pub async fn list(
    OrganizationId(organization_id): OrganizationId,
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse<RecordView>>, ServerError> {
    let Query(query) = query?;
    let tag_ids = tag_filter(&query)?;
    let page = state
        .engine
        .list_records(organization_id, &tag_ids, page_request(&query))
        .await?;

    let pagination = pagination(&page);
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(record_view).collect(),
        pagination,
    }))
}
