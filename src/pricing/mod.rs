//! Pricing engine module.
//!
//! Pure functions only. The forecast workflow calls [`forecast_price`]
//! exactly once, at the approve transition, before `date_complete` is set.

pub mod calculators;

pub use calculators::{forecast_price, round_money, PricedLine};
