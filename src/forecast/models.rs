//! Database models for the forecast workflow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Workflow status of a forecast.
///
/// Status only ever advances along the transition graph:
/// Draft -> Submitted -> {Approved, Rejected}, and Draft -> Deleted.
/// Approved, Rejected and Deleted are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastStatus {
    Draft = 1,
    Submitted = 2,
    Approved = 3,
    Rejected = 4,
    Deleted = 5,
}

impl ForecastStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Draft),
            2 => Some(Self::Submitted),
            3 => Some(Self::Approved),
            4 => Some(Self::Rejected),
            5 => Some(Self::Deleted),
            _ => None,
        }
    }

}

/// Forecast aggregate root from the database.
#[derive(Debug, Clone, FromRow)]
pub struct Forecast {
    pub id: Uuid,
    pub owner: Uuid,
    pub moderator: Option<Uuid>,
    pub status: i16,
    /// Forecast horizon; must be set (and positive) before submission.
    pub days: Option<i32>,
    pub date_created: DateTime<Utc>,
    pub date_formation: Option<DateTime<Utc>>,
    pub date_complete: Option<DateTime<Utc>>,
    /// Populated only when the forecast has been approved.
    pub price: Option<Decimal>,
}

impl Forecast {
    pub fn status(&self) -> Option<ForecastStatus> {
        ForecastStatus::from_i16(self.status)
    }
}

/// A forecast line item joined with its tariff, in insertion order.
#[derive(Debug, Clone, FromRow)]
pub struct ForecastItem {
    pub tariff_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub count: i32,
}
