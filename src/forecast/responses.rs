//! Response DTOs for forecast endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::models::{Forecast, ForecastItem};

/// A line item as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub tariff_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub image: Option<String>,
    pub count: i32,
}

impl From<ForecastItem> for ItemResponse {
    fn from(item: ForecastItem) -> Self {
        Self {
            tariff_id: item.tariff_id,
            name: item.name,
            price: item.price,
            image: item.image,
            count: item.count,
        }
    }
}

/// Full forecast view, line items included
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub moderator: Option<Uuid>,
    pub status: i16,
    pub days: Option<i32>,
    pub date_created: DateTime<Utc>,
    pub date_formation: Option<DateTime<Utc>>,
    pub date_complete: Option<DateTime<Utc>>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    pub tariffs: Vec<ItemResponse>,
}

impl ForecastResponse {
    pub fn from_parts(forecast: Forecast, items: Vec<ForecastItem>) -> Self {
        Self {
            id: forecast.id,
            owner: forecast.owner,
            moderator: forecast.moderator,
            status: forecast.status,
            days: forecast.days,
            date_created: forecast.date_created,
            date_formation: forecast.date_formation,
            date_complete: forecast.date_complete,
            price: forecast.price,
            tariffs: items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

/// Listing view, without line items
#[derive(Debug, Serialize)]
pub struct ForecastSummaryResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub moderator: Option<Uuid>,
    pub status: i16,
    pub days: Option<i32>,
    pub date_formation: Option<DateTime<Utc>>,
    pub date_complete: Option<DateTime<Utc>>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
}

impl From<Forecast> for ForecastSummaryResponse {
    fn from(f: Forecast) -> Self {
        Self {
            id: f.id,
            owner: f.owner,
            moderator: f.moderator,
            status: f.status,
            days: f.days,
            date_formation: f.date_formation,
            date_complete: f.date_complete,
            price: f.price,
        }
    }
}

/// Cart badge info for the current buyer
#[derive(Debug, Serialize)]
pub struct CartInfoResponse {
    pub tariffs_count: i64,
    pub draft_forecast: Option<Uuid>,
}
