//! Backend for the cloud-tariff price-forecasting marketplace.
//!
//! Buyers browse the tariff catalog, collect tariffs into a draft forecast,
//! and submit it; moderators approve (which prices it) or reject. The
//! forecast workflow in [`forecast`] is the core; everything else is thin
//! handler glue over Postgres and the session store.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod session;

use sqlx::PgPool;

use session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sessions: SessionStore,
}
