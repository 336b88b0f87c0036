//! Transaction category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::Paginated;
use domain::{CategoryResponse, CreateCategory, UpdateCategory};
use record_store::{CategoryFilter, LedgerStore};
use serde::Deserialize;

use super::params;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub classification: Option<String>,
}

/// POST /transaction-categories
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let Json(req) = payload?;
    let category = state.categories.create(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /transaction-categories
#[tracing::instrument(skip(state, query))]
pub async fn list<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Paginated<CategoryResponse>>, ApiError> {
    let Query(query) = query?;
    let page = params::page_request(
        params::present(&query.page),
        params::present(&query.limit),
    );
    let filter = CategoryFilter {
        classification: params::label(
            "classification",
            params::present(&query.classification),
        )?,
    };
    Ok(Json(state.categories.list(filter, page).await?))
}

/// GET /transaction-categories/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    Ok(Json(state.categories.get_by_id(&id).await?))
}

/// PATCH /transaction-categories/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.categories.update(&id, req).await?))
}

/// DELETE /transaction-categories/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.categories.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
