//! Database record models

pub mod tariff;
pub mod user;

pub use tariff::{Tariff, TariffStatus};
pub use user::User;
