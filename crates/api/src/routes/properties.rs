//! Property endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::Paginated;
use domain::{CreateProperty, PropertyResponse, UpdateProperty};
use record_store::LedgerStore;
use serde::Deserialize;

use super::params;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// POST /properties
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateProperty>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    let Json(req) = payload?;
    let property = state.properties.create(req).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// GET /properties
#[tracing::instrument(skip(state, query))]
pub async fn list<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Paginated<PropertyResponse>>, ApiError> {
    let Query(query) = query?;
    let page = params::page_request(
        params::present(&query.page),
        params::present(&query.limit),
    );
    Ok(Json(state.properties.list(page).await?))
}

/// GET /properties/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    Ok(Json(state.properties.get_by_id(&id).await?))
}

/// PATCH /properties/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProperty>, JsonRejection>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.properties.update(&id, req).await?))
}

/// DELETE /properties/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.properties.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
