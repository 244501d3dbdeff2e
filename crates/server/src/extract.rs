//! Request extractors and query-string parsing shared by the handlers.

use api_types::pagination::{ListQuery, Pagination};
use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};
use engine::{Page, PageRequest};

use crate::ServerError;

/// JSON body whose rejection is reported as a `400 {"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// The `{org_id}` path segment: a positive integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrganizationId(pub i64);

impl<S> FromRequestParts<S> for OrganizationId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|err| ServerError::Generic(err.body_text()))?;
        parse_organization_id(&raw).map(Self)
    }
}

fn parse_organization_id(raw: &str) -> Result<i64, ServerError> {
    match raw.parse::<u32>() {
        Ok(id) if id >= 1 => Ok(i64::from(id)),
        _ => Err(ServerError::Generic(format!(
            "organization id must be a positive integer, got {raw:?}"
        ))),
    }
}

fn lenient_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// `page`/`page_size` that are missing, non-numeric or `< 1` fall back to the
/// defaults.
pub(crate) fn page_request(query: &ListQuery) -> PageRequest {
    PageRequest::new(
        lenient_int(query.page.as_deref()),
        lenient_int(query.page_size.as_deref()),
    )
}

/// Comma-separated tag ids; blank segments are skipped.
pub(crate) fn tag_filter(query: &ListQuery) -> Result<Vec<i32>, ServerError> {
    let Some(raw) = query.tags.as_deref() else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<i32>()
                .map_err(|_| ServerError::Generic(format!("invalid tag id: {segment:?}")))
        })
        .collect()
}

pub(crate) fn pagination<T>(page: &Page<T>) -> Pagination {
    Pagination {
        current_page: page.request.page(),
        page_size: page.request.page_size(),
        total_items: page.total,
        total_pages: page.total_pages(),
    }
}
