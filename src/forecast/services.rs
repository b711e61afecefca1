//! Forecast service functions with database access.
//!
//! Each operation is one read-check-write sequence: load the aggregate,
//! run the pure workflow guards, persist the outcome. Ownership failures
//! come back as NotFound so existence is never leaked to non-owners.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::pricing::PricedLine;

use super::models::{Forecast, ForecastItem};
use super::queries;
use super::requests::{SearchForecastsQuery, UpdateForecastRequest, UpdateItemRequest};
use super::responses::{CartInfoResponse, ForecastResponse, ForecastSummaryResponse, ItemResponse};
use super::workflow;

/// True when `user` may see or act on `forecast`. Moderators double as
/// privileged administrators.
fn accessible(forecast: &Forecast, user: &User) -> bool {
    forecast.owner == user.id || user.is_moderator
}

/// Load a forecast the acting user is allowed to touch, masking
/// other users' forecasts as missing.
async fn load_accessible(pool: &PgPool, user: &User, id: Uuid) -> Result<Forecast> {
    let forecast = queries::get_forecast(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !accessible(&forecast, user) {
        return Err(AppError::NotFound);
    }

    Ok(forecast)
}

async fn current_items(pool: &PgPool, forecast_id: Uuid) -> Result<Vec<ItemResponse>> {
    let items = queries::get_items(pool, forecast_id).await?;
    Ok(items.into_iter().map(ItemResponse::from).collect())
}

fn priced_lines(items: &[ForecastItem]) -> Vec<PricedLine> {
    items
        .iter()
        .map(|i| PricedLine {
            unit_price: i.price,
            count: i.count,
        })
        .collect()
}

/// A tariff appears in a draft at most once; a repeat is a conflict and
/// leaves the existing line item untouched. Counts change through the
/// item endpoint.
fn ensure_not_in_draft(items: &[ForecastItem], tariff_id: Uuid) -> Result<()> {
    if items.iter().any(|i| i.tariff_id == tariff_id) {
        return Err(AppError::conflict("tariff already in forecast"));
    }
    Ok(())
}

/// Add an active tariff to the buyer's draft, creating the draft on first
/// use. A duplicate tariff is a conflict; the existing item is untouched.
pub async fn add_tariff_to_draft(
    pool: &PgPool,
    user: &User,
    tariff_id: Uuid,
) -> Result<Vec<ItemResponse>> {
    let tariff = db::get_tariff(pool, tariff_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !tariff.is_active() {
        // Retired tariffs are not discoverable, so not addable either.
        return Err(AppError::NotFound);
    }

    let draft = match queries::get_draft_forecast(pool, user.id).await? {
        Some(draft) => draft,
        None => {
            let draft = workflow::new_draft(user.id, Utc::now());
            tracing::info!(forecast_id = %draft.id, owner = %user.id, "creating draft forecast");
            queries::insert_forecast(pool, &draft).await?
        }
    };

    let existing = queries::get_items(pool, draft.id).await?;
    ensure_not_in_draft(&existing, tariff_id)?;

    queries::insert_item(pool, draft.id, tariff_id).await?;
    current_items(pool, draft.id).await
}

/// Cart badge: the draft's id and item count, zeros when no draft exists.
pub async fn cart_info(pool: &PgPool, user: &User) -> Result<CartInfoResponse> {
    match queries::get_draft_forecast(pool, user.id).await? {
        Some(draft) => Ok(CartInfoResponse {
            tariffs_count: queries::count_items(pool, draft.id).await?,
            draft_forecast: Some(draft.id),
        }),
        None => Ok(CartInfoResponse {
            tariffs_count: 0,
            draft_forecast: None,
        }),
    }
}

/// Search forecasts by status and formation-date range.
///
/// Drafts and deleted forecasts never appear; non-moderators are scoped to
/// their own. Supplied date bounds are widened by one day each way.
pub async fn search(
    pool: &PgPool,
    user: &User,
    query: &SearchForecastsQuery,
) -> Result<Vec<ForecastSummaryResponse>> {
    let owner = (!user.is_moderator).then_some(user.id);
    let (start, end) = queries::widen_bounds(query.date_formation_start, query.date_formation_end);

    let forecasts = queries::search_forecasts(pool, owner, query.status, start, end).await?;
    Ok(forecasts
        .into_iter()
        .map(ForecastSummaryResponse::from)
        .collect())
}

/// Fetch one forecast with its line items.
pub async fn get(pool: &PgPool, user: &User, id: Uuid) -> Result<ForecastResponse> {
    let forecast = load_accessible(pool, user, id).await?;
    let items = queries::get_items(pool, id).await?;
    Ok(ForecastResponse::from_parts(forecast, items))
}

/// Partial update of a draft's `days` field.
pub async fn update(
    pool: &PgPool,
    user: &User,
    id: Uuid,
    request: &UpdateForecastRequest,
) -> Result<ForecastResponse> {
    request.validate()?;
    let mut forecast = load_accessible(pool, user, id).await?;

    if let Some(days) = request.days {
        workflow::ensure_mutable(&forecast)?;
        forecast = queries::update_days(pool, id, days).await?;
    }

    let items = queries::get_items(pool, id).await?;
    Ok(ForecastResponse::from_parts(forecast, items))
}

/// Draft -> Submitted, by the owner.
pub async fn submit(pool: &PgPool, user: &User, id: Uuid) -> Result<ForecastResponse> {
    let mut forecast = load_accessible(pool, user, id).await?;

    workflow::submit(&mut forecast, Utc::now())?;
    if !queries::store_submission(pool, &forecast).await? {
        // Lost a race: the row moved out of Draft since we loaded it.
        return Err(AppError::guard("forecast is in the wrong status"));
    }

    tracing::info!(forecast_id = %id, owner = %user.id, "forecast submitted");
    let items = queries::get_items(pool, id).await?;
    Ok(ForecastResponse::from_parts(forecast, items))
}

/// Submitted -> {Approved, Rejected}, by a moderator. Approval prices the
/// forecast from its current line items.
pub async fn decide(
    pool: &PgPool,
    moderator: &User,
    id: Uuid,
    target: i16,
) -> Result<ForecastResponse> {
    let mut forecast = queries::get_forecast(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = queries::get_items(pool, id).await?;
    workflow::decide(
        &mut forecast,
        target,
        moderator.id,
        &priced_lines(&items),
        Utc::now(),
    )?;

    if !queries::store_decision(pool, &forecast).await? {
        // Another moderator decided first; the CAS on Submitted failed.
        return Err(AppError::guard("forecast is in the wrong status"));
    }

    tracing::info!(
        forecast_id = %id,
        moderator = %moderator.id,
        status = forecast.status,
        "forecast decided"
    );
    Ok(ForecastResponse::from_parts(forecast, items))
}

/// Draft -> Deleted, by the owner. Soft delete; line items stay.
pub async fn delete(pool: &PgPool, user: &User, id: Uuid) -> Result<ForecastResponse> {
    let mut forecast = load_accessible(pool, user, id).await?;

    workflow::discard(&mut forecast)?;
    if !queries::store_deletion(pool, id).await? {
        return Err(AppError::guard("forecast is in the wrong status"));
    }

    let items = queries::get_items(pool, id).await?;
    Ok(ForecastResponse::from_parts(forecast, items))
}

/// Update a line item's count. Draft only.
pub async fn update_item(
    pool: &PgPool,
    user: &User,
    id: Uuid,
    tariff_id: Uuid,
    request: &UpdateItemRequest,
) -> Result<Vec<ItemResponse>> {
    request.validate()?;
    let forecast = load_accessible(pool, user, id).await?;
    workflow::ensure_mutable(&forecast)?;

    if !queries::update_item_count(pool, id, tariff_id, request.count).await? {
        return Err(AppError::NotFound);
    }

    current_items(pool, id).await
}

/// Remove a line item. Draft only.
pub async fn remove_item(
    pool: &PgPool,
    user: &User,
    id: Uuid,
    tariff_id: Uuid,
) -> Result<Vec<ItemResponse>> {
    let forecast = load_accessible(pool, user, id).await?;
    workflow::ensure_mutable(&forecast)?;

    if !queries::delete_item(pool, id, tariff_id).await? {
        return Err(AppError::NotFound);
    }

    current_items(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn user(id: Uuid, is_moderator: bool) -> User {
        User {
            id,
            username: "u".to_string(),
            password_hash: String::new(),
            is_moderator,
        }
    }

    #[test]
    fn owner_and_moderator_can_access_others_cannot() {
        let owner = Uuid::new_v4();
        let forecast = workflow::new_draft(owner, Utc::now());

        assert!(accessible(&forecast, &user(owner, false)));
        assert!(accessible(&forecast, &user(Uuid::new_v4(), true)));
        assert!(!accessible(&forecast, &user(Uuid::new_v4(), false)));
    }

    fn item(tariff_id: Uuid) -> ForecastItem {
        ForecastItem {
            tariff_id,
            name: "basic".to_string(),
            price: dec!(1.50),
            image: None,
            count: 3,
        }
    }

    #[test]
    fn priced_lines_carry_price_and_count() {
        let items = vec![item(Uuid::new_v4())];

        let lines = priced_lines(&items);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_price, dec!(1.50));
        assert_eq!(lines[0].count, 3);
    }

    #[test]
    fn adding_the_same_tariff_twice_is_a_conflict() {
        let tariff_id = Uuid::new_v4();
        let items = vec![item(tariff_id)];

        let err = ensure_not_in_draft(&items, tariff_id).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // The existing line item is untouched.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].count, 3);
    }

    #[test]
    fn a_tariff_not_yet_in_the_draft_passes_the_duplicate_check() {
        let items = vec![item(Uuid::new_v4())];
        assert!(ensure_not_in_draft(&items, Uuid::new_v4()).is_ok());
        assert!(ensure_not_in_draft(&[], Uuid::new_v4()).is_ok());
    }
}
