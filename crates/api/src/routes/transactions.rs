//! Transaction endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::Paginated;
use domain::{CreateTransaction, TransactionResponse, UpdateTransaction};
use record_store::{LedgerStore, TransactionFilter};
use serde::Deserialize;

use super::params::{self, DayBound};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub property_id: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<TransactionFilter, ApiError> {
        Ok(TransactionFilter {
            property_id: params::present(&self.property_id).map(String::from),
            transaction_type: params::label("type", params::present(&self.transaction_type))?,
            category_id: params::present(&self.category_id).map(String::from),
            start_date: params::date(
                "startDate",
                params::present(&self.start_date),
                DayBound::Start,
            )?,
            end_date: params::date("endDate", params::present(&self.end_date), DayBound::End)?,
        })
    }
}

/// POST /transactions
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let Json(req) = payload?;
    let transaction = state.transactions.create(req).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /transactions
#[tracing::instrument(skip(state, query))]
pub async fn list<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Paginated<TransactionResponse>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let page = params::page_request(
        params::present(&query.page),
        params::present(&query.limit),
    );
    Ok(Json(state.transactions.list(filter, page).await?))
}

/// GET /transactions/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    Ok(Json(state.transactions.get_by_id(&id).await?))
}

/// PUT /transactions/{id}: full replacement.
#[tracing::instrument(skip(state, payload))]
pub async fn replace<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<CreateTransaction>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.transactions.replace(&id, req).await?))
}

/// PATCH /transactions/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTransaction>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.transactions.update(&id, req).await?))
}

/// DELETE /transactions/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: LedgerStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.transactions.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
