//! Tariff catalog model

use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog lifecycle status. Retired tariffs are soft-deleted, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TariffStatus {
    Active = 1,
    Retired = 2,
}

impl TariffStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Active),
            2 => Some(Self::Retired),
            _ => None,
        }
    }
}

/// Tariff from the database
#[derive(Debug, Clone, FromRow)]
pub struct Tariff {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price per unit per day.
    pub price: Decimal,
    /// Base64 data URL, set via the image upload endpoint.
    pub image: Option<String>,
    pub status: i16,
}

impl Tariff {
    pub fn is_active(&self) -> bool {
        self.status == TariffStatus::Active.as_i16()
    }
}
