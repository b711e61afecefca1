//! Database queries for forecasts and their line items.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{Forecast, ForecastItem, ForecastStatus};

/// Widen supplied date_formation bounds by one day in each direction.
///
/// A deliberate fuzz margin: searching with bound `D` also matches
/// forecasts formed exactly at `D`, since the underlying comparison is
/// strict.
pub fn widen_bounds(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    (
        start.map(|s| s - Duration::days(1)),
        end.map(|e| e + Duration::days(1)),
    )
}

/// Get a forecast by id
pub async fn get_forecast(pool: &PgPool, id: Uuid) -> Result<Option<Forecast>> {
    let forecast = sqlx::query_as::<_, Forecast>(
        r#"
        SELECT id, owner, moderator, status, days,
               date_created, date_formation, date_complete, price
        FROM forecasts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(forecast)
}

/// Get the owner's current draft forecast, if one exists
pub async fn get_draft_forecast(pool: &PgPool, owner: Uuid) -> Result<Option<Forecast>> {
    let forecast = sqlx::query_as::<_, Forecast>(
        r#"
        SELECT id, owner, moderator, status, days,
               date_created, date_formation, date_complete, price
        FROM forecasts
        WHERE owner = $1 AND status = $2
        ORDER BY date_created DESC
        LIMIT 1
        "#,
    )
    .bind(owner)
    .bind(ForecastStatus::Draft.as_i16())
    .fetch_optional(pool)
    .await?;

    Ok(forecast)
}

/// Insert a freshly created draft
pub async fn insert_forecast(pool: &PgPool, forecast: &Forecast) -> Result<Forecast> {
    let forecast = sqlx::query_as::<_, Forecast>(
        r#"
        INSERT INTO forecasts (id, owner, status, date_created)
        VALUES ($1, $2, $3, $4)
        RETURNING id, owner, moderator, status, days,
                  date_created, date_formation, date_complete, price
        "#,
    )
    .bind(forecast.id)
    .bind(forecast.owner)
    .bind(forecast.status)
    .bind(forecast.date_created)
    .fetch_one(pool)
    .await?;

    Ok(forecast)
}

/// Update the mutable `days` field of a draft
pub async fn update_days(pool: &PgPool, id: Uuid, days: i32) -> Result<Forecast> {
    let forecast = sqlx::query_as::<_, Forecast>(
        r#"
        UPDATE forecasts
        SET days = $2
        WHERE id = $1
        RETURNING id, owner, moderator, status, days,
                  date_created, date_formation, date_complete, price
        "#,
    )
    .bind(id)
    .bind(days)
    .fetch_one(pool)
    .await?;

    Ok(forecast)
}

/// Persist a Draft -> Submitted transition.
///
/// The `status = Draft` condition makes the write a compare-and-swap; a
/// concurrent transition loses and writes nothing.
pub async fn store_submission(pool: &PgPool, forecast: &Forecast) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE forecasts
        SET status = $2, date_formation = $3
        WHERE id = $1 AND status = $4
        "#,
    )
    .bind(forecast.id)
    .bind(forecast.status)
    .bind(forecast.date_formation)
    .bind(ForecastStatus::Draft.as_i16())
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

/// Persist a Submitted -> {Approved, Rejected} decision.
///
/// Compare-and-swap on `status = Submitted`: of two concurrent moderator
/// decisions, exactly one lands.
pub async fn store_decision(pool: &PgPool, forecast: &Forecast) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE forecasts
        SET status = $2, moderator = $3, price = $4, date_complete = $5
        WHERE id = $1 AND status = $6
        "#,
    )
    .bind(forecast.id)
    .bind(forecast.status)
    .bind(forecast.moderator)
    .bind(forecast.price)
    .bind(forecast.date_complete)
    .bind(ForecastStatus::Submitted.as_i16())
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

/// Persist a Draft -> Deleted soft delete. Line items stay in place.
pub async fn store_deletion(pool: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE forecasts
        SET status = $2
        WHERE id = $1 AND status = $3
        "#,
    )
    .bind(id)
    .bind(ForecastStatus::Deleted.as_i16())
    .bind(ForecastStatus::Draft.as_i16())
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

/// Search forecasts, always excluding Draft and Deleted.
///
/// `owner` restricts visibility for non-moderators; pass `None` for the
/// moderator view. Date bounds are expected pre-widened via [`widen_bounds`].
pub async fn search_forecasts(
    pool: &PgPool,
    owner: Option<Uuid>,
    status: Option<i16>,
    formed_after: Option<DateTime<Utc>>,
    formed_before: Option<DateTime<Utc>>,
) -> Result<Vec<Forecast>> {
    let forecasts = sqlx::query_as::<_, Forecast>(
        r#"
        SELECT id, owner, moderator, status, days,
               date_created, date_formation, date_complete, price
        FROM forecasts
        WHERE status NOT IN ($1, $2)
          AND ($3::uuid IS NULL OR owner = $3)
          AND ($4::smallint IS NULL OR status = $4)
          AND ($5::timestamptz IS NULL OR date_formation > $5)
          AND ($6::timestamptz IS NULL OR date_formation < $6)
        ORDER BY date_formation DESC NULLS LAST
        "#,
    )
    .bind(ForecastStatus::Draft.as_i16())
    .bind(ForecastStatus::Deleted.as_i16())
    .bind(owner)
    .bind(status)
    .bind(formed_after)
    .bind(formed_before)
    .fetch_all(pool)
    .await?;

    Ok(forecasts)
}

/// Get a forecast's line items joined with their tariffs, in insertion order
pub async fn get_items(pool: &PgPool, forecast_id: Uuid) -> Result<Vec<ForecastItem>> {
    let items = sqlx::query_as::<_, ForecastItem>(
        r#"
        SELECT t.id AS tariff_id, t.name, t.price, t.image, i.count
        FROM forecast_items i
        JOIN tariffs t ON t.id = i.tariff_id
        WHERE i.forecast_id = $1
        ORDER BY i.added_at
        "#,
    )
    .bind(forecast_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Count a forecast's line items (cart badge)
pub async fn count_items(pool: &PgPool, forecast_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM forecast_items
        WHERE forecast_id = $1
        "#,
    )
    .bind(forecast_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Insert a line item with the default count. Requires the tariff to be
/// active, enforced by the caller.
///
/// Two concurrent adds of the same tariff both pass the caller's duplicate
/// check; the loser hits the (forecast_id, tariff_id) primary key and gets
/// the same conflict it would have seen sequentially.
pub async fn insert_item(pool: &PgPool, forecast_id: Uuid, tariff_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO forecast_items (forecast_id, tariff_id, count, added_at)
        VALUES ($1, $2, 1, $3)
        "#,
    )
    .bind(forecast_id)
    .bind(tariff_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(duplicate_item_error)?;

    Ok(())
}

fn duplicate_item_error(e: sqlx::Error) -> AppError {
    if e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        AppError::conflict("tariff already in forecast")
    } else {
        AppError::Database(e)
    }
}

/// Update a line item's count
pub async fn update_item_count(
    pool: &PgPool,
    forecast_id: Uuid,
    tariff_id: Uuid,
    count: i32,
) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE forecast_items
        SET count = $3
        WHERE forecast_id = $1 AND tariff_id = $2
        "#,
    )
    .bind(forecast_id)
    .bind(tariff_id)
    .bind(count)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

/// Remove a line item
pub async fn delete_item(pool: &PgPool, forecast_id: Uuid, tariff_id: Uuid) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        DELETE FROM forecast_items
        WHERE forecast_id = $1 AND tariff_id = $2
        "#,
    )
    .bind(forecast_id)
    .bind(tariff_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::fmt;

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "stub")
        }
    }

    impl std::error::Error for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub"
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn racing_duplicate_insert_surfaces_as_conflict() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: true }));
        assert!(matches!(duplicate_item_error(e), AppError::Conflict(_)));
    }

    #[test]
    fn other_insert_errors_stay_database_errors() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: false }));
        assert!(matches!(duplicate_item_error(e), AppError::Database(_)));

        assert!(matches!(
            duplicate_item_error(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn widen_bounds_moves_each_side_one_day_out() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();

        let (wide_start, wide_end) = widen_bounds(Some(start), Some(end));
        assert_eq!(
            wide_start,
            Some(Utc.with_ymd_and_hms(2024, 5, 9, 12, 0, 0).unwrap())
        );
        assert_eq!(
            wide_end,
            Some(Utc.with_ymd_and_hms(2024, 5, 21, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn widen_bounds_passes_missing_bounds_through() {
        assert_eq!(widen_bounds(None, None), (None, None));

        let d = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let (start, end) = widen_bounds(Some(d), None);
        assert!(start.is_some());
        assert!(end.is_none());
    }

    #[test]
    fn exact_bound_falls_inside_widened_range() {
        // A forecast formed exactly at the supplied bound D must match:
        // the query compares strictly against D +/- 1 day.
        let d = Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap();
        let (start, end) = widen_bounds(Some(d), Some(d));
        assert!(start.unwrap() < d);
        assert!(end.unwrap() > d);
    }
}
