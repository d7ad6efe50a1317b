//! Query-string and path extraction for list and item endpoints.

use std::collections::BTreeMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::Entity;
use ott_core::types::DbId;

use crate::error::AppError;

/// Raw query parameters, e.g. `?page=2&limit=5&query=dune&status=PUBLISHED`.
pub type QueryParams = BTreeMap<String, String>;

/// Parameters that are not filters.
const PAGE: &str = "page";
const LIMIT: &str = "limit";
const SEARCH: &str = "query";

/// Paged list query for `E`: `page`, `limit`, `query` plus one equality
/// filter per remaining parameter. Unknown parameters are rejected.
pub fn list_query<E: Entity>(params: &QueryParams) -> Result<ListQuery, CoreError> {
    let page = parse_number(params, PAGE)?;
    let limit = parse_number(params, LIMIT)?;
    let query = ListQuery::paged(page, limit)?;
    with_search_and_filters::<E>(query, params)
}

/// Unpaginated query for `/all` endpoints; `page` and `limit` are ignored.
pub fn all_query<E: Entity>(params: &QueryParams) -> Result<ListQuery, CoreError> {
    with_search_and_filters::<E>(ListQuery::all(), params)
}

fn with_search_and_filters<E: Entity>(
    query: ListQuery,
    params: &QueryParams,
) -> Result<ListQuery, CoreError> {
    let mut query = query.with_search(params.get(SEARCH).map(String::as_str));
    for (field, raw) in params {
        if matches!(field.as_str(), PAGE | LIMIT | SEARCH) {
            continue;
        }
        query = query.with_filter(E::FILTER_FIELDS, field, raw)?;
    }
    Ok(query)
}

fn parse_number(params: &QueryParams, name: &str) -> Result<Option<i64>, CoreError> {
    match params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| CoreError::invalid_field(name, format!("\"{name}\" must be a number"))),
    }
}

/// Positive entity id from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub DbId);

impl<S: Send + Sync> FromRequestParts<S> for EntityId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<DbId>::from_request_parts(parts, state).await {
            Ok(Path(id)) if id > 0 => Ok(EntityId(id)),
            _ => Err(AppError::Core(CoreError::invalid_field(
                "id",
                "\"id\" must be a valid id",
            ))),
        }
    }
}
