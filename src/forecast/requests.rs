//! Request DTOs for forecast endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Query parameters for forecast search
#[derive(Debug, Default, Deserialize)]
pub struct SearchForecastsQuery {
    #[serde(default)]
    pub status: Option<i16>,
    #[serde(default)]
    pub date_formation_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_formation_end: Option<DateTime<Utc>>,
}

/// Partial update of a draft forecast
#[derive(Debug, Deserialize)]
pub struct UpdateForecastRequest {
    pub days: Option<i32>,
}

impl UpdateForecastRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(days) = self.days {
            if days <= 0 {
                return Err(AppError::validation("days must be positive"));
            }
        }
        Ok(())
    }
}

/// Moderator decision body: the requested target status code
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub status: i16,
}

/// Update of a single line item
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub count: i32,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<()> {
        if self.count < 1 {
            return Err(AppError::validation("count must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_forecast_rejects_nonpositive_days() {
        assert!(UpdateForecastRequest { days: Some(0) }.validate().is_err());
        assert!(UpdateForecastRequest { days: Some(-1) }.validate().is_err());
        assert!(UpdateForecastRequest { days: Some(7) }.validate().is_ok());
        // days omitted is a no-op update, not an error
        assert!(UpdateForecastRequest { days: None }.validate().is_ok());
    }

    #[test]
    fn update_item_rejects_nonpositive_count() {
        assert!(UpdateItemRequest { count: 0 }.validate().is_err());
        assert!(UpdateItemRequest { count: -2 }.validate().is_err());
        assert!(UpdateItemRequest { count: 3 }.validate().is_ok());
    }
}
