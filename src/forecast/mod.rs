//! Forecast workflow module.
//!
//! A forecast is the cart/order aggregate: a buyer collects tariffs into a
//! draft, submits it, and a moderator approves (pricing it) or rejects it.
//! `workflow` holds the pure state machine; `services` wires it to storage.

pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod workflow;

pub use models::{Forecast, ForecastStatus};
pub use routes::router;
