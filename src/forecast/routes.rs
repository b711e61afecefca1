//! Forecast route handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::Result;
use crate::AppState;

use super::requests::{
    DecideRequest, SearchForecastsQuery, UpdateForecastRequest, UpdateItemRequest,
};
use super::responses::{CartInfoResponse, ForecastResponse, ForecastSummaryResponse, ItemResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/cart", get(cart))
        .route(
            "/:id",
            get(detail).put(update).delete(delete_forecast),
        )
        .route("/:id/submit", put(submit))
        .route("/:id/decide", put(decide))
        .route(
            "/:id/tariffs/:tariff_id",
            put(update_item).delete(remove_item),
        )
}

/// Search non-draft, non-deleted forecasts
async fn search(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<SearchForecastsQuery>,
) -> Result<Json<Vec<ForecastSummaryResponse>>> {
    let user = identity.authenticated()?;
    Ok(Json(services::search(&state.db, &user, &query).await?))
}

/// Current buyer's cart badge
async fn cart(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CartInfoResponse>> {
    let user = identity.buyer()?;
    Ok(Json(services::cart_info(&state.db, &user).await?))
}

/// One forecast with line items
async fn detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ForecastResponse>> {
    let user = identity.authenticated()?;
    Ok(Json(services::get(&state.db, &user, id).await?))
}

/// Partial update of a draft
async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateForecastRequest>,
) -> Result<Json<ForecastResponse>> {
    let user = identity.buyer()?;
    Ok(Json(services::update(&state.db, &user, id, &request).await?))
}

/// Owner submits a draft for moderation
async fn submit(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ForecastResponse>> {
    let user = identity.buyer()?;
    Ok(Json(services::submit(&state.db, &user, id).await?))
}

/// Moderator approves or rejects a submitted forecast
async fn decide(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideRequest>,
) -> Result<Json<ForecastResponse>> {
    let moderator = identity.moderator()?;
    Ok(Json(
        services::decide(&state.db, &moderator, id, request.status).await?,
    ))
}

/// Owner soft-deletes a draft
async fn delete_forecast(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ForecastResponse>> {
    let user = identity.buyer()?;
    Ok(Json(services::delete(&state.db, &user, id).await?))
}

/// Update a line item's count
async fn update_item(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, tariff_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<Vec<ItemResponse>>> {
    let user = identity.buyer()?;
    Ok(Json(
        services::update_item(&state.db, &user, id, tariff_id, &request).await?,
    ))
}

/// Remove a line item
async fn remove_item(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, tariff_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<ItemResponse>>> {
    let user = identity.buyer()?;
    Ok(Json(
        services::remove_item(&state.db, &user, id, tariff_id).await?,
    ))
}
