//! Tariff catalog route handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::db;
use crate::error::{AppError, Result};
use crate::forecast::responses::ItemResponse;
use crate::forecast::services as forecast_services;
use crate::models::Tariff;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/:id", get(detail).put(update).delete(retire))
        .route("/:id/image", post(upload_image))
        .route("/:id/draft", post(add_to_draft))
}

/// Query parameters for tariff search
#[derive(Debug, Default, Deserialize)]
pub struct SearchTariffsQuery {
    #[serde(default)]
    pub tariff_name: Option<String>,
}

/// Tariff as returned to clients
#[derive(Debug, Serialize)]
pub struct TariffResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub image: Option<String>,
    pub status: i16,
}

impl From<Tariff> for TariffResponse {
    fn from(t: Tariff) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            price: t.price,
            image: t.image,
            status: t.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTariffRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTariffRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation("price must be positive"));
    }
    Ok(())
}

async fn active_list(state: &AppState) -> Result<Json<Vec<TariffResponse>>> {
    let tariffs = db::search_active_tariffs(&state.db, None).await?;
    Ok(Json(tariffs.into_iter().map(TariffResponse::from).collect()))
}

/// List active tariffs, optionally filtered by name substring
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchTariffsQuery>,
) -> Result<Json<Vec<TariffResponse>>> {
    let name = query.tariff_name.as_deref().filter(|n| !n.is_empty());
    let tariffs = db::search_active_tariffs(&state.db, name).await?;
    Ok(Json(tariffs.into_iter().map(TariffResponse::from).collect()))
}

/// One tariff by id, any status
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TariffResponse>> {
    let tariff = db::get_tariff(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(tariff.into()))
}

/// Moderator creates a tariff; returns the refreshed active list
async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateTariffRequest>,
) -> Result<Json<Vec<TariffResponse>>> {
    identity.moderator()?;
    validate_name(&request.name)?;
    validate_price(request.price)?;

    db::create_tariff(&state.db, &request.name, &request.description, request.price).await?;
    active_list(&state).await
}

/// Moderator partially updates a tariff
async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTariffRequest>,
) -> Result<Json<TariffResponse>> {
    identity.moderator()?;
    if let Some(name) = &request.name {
        validate_name(name)?;
    }
    if let Some(price) = request.price {
        validate_price(price)?;
    }

    db::get_tariff(&state.db, id).await?.ok_or(AppError::NotFound)?;

    let tariff = db::update_tariff(
        &state.db,
        id,
        request.name.as_deref(),
        request.description.as_deref(),
        request.price,
    )
    .await?;
    Ok(Json(tariff.into()))
}

/// Moderator retires a tariff (soft delete); returns the refreshed active list
async fn retire(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TariffResponse>>> {
    identity.moderator()?;
    db::get_tariff(&state.db, id).await?.ok_or(AppError::NotFound)?;

    db::retire_tariff(&state.db, id).await?;
    active_list(&state).await
}

/// Moderator replaces a tariff's image. Accepts a raw image body, sniffs
/// the format, and stores it as a base64 data URL.
async fn upload_image(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TariffResponse>> {
    identity.moderator()?;
    db::get_tariff(&state.db, id).await?.ok_or(AppError::NotFound)?;

    if body.is_empty() {
        return Err(AppError::validation("image body is empty"));
    }
    let format = image::guess_format(&body)
        .map_err(|_| AppError::validation("unrecognized image format"))?;

    let data_url = format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        BASE64.encode(&body)
    );
    let tariff = db::set_tariff_image(&state.db, id, &data_url).await?;
    Ok(Json(tariff.into()))
}

/// Buyer adds this tariff to their draft forecast (created on first use)
async fn add_to_draft(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ItemResponse>>> {
    let user = identity.buyer()?;
    Ok(Json(
        forecast_services::add_tariff_to_draft(&state.db, &user, id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn name_validation_rejects_blank() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("compute-basic").is_ok());
    }

    #[test]
    fn price_validation_rejects_nonpositive() {
        assert!(validate_price(dec!(0)).is_err());
        assert!(validate_price(dec!(-1.50)).is_err());
        assert!(validate_price(dec!(0.01)).is_ok());
    }
}
