pub mod entries;
pub mod health;
pub mod owners;
pub mod revenue;
pub mod settlements;

use crate::db::Repository;
use crate::settlement::SettlementWriter;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub writer: Arc<SettlementWriter>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, writer: Arc<SettlementWriter>) -> Self {
        Self { repo, writer }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/entries", get(entries::get_entries))
        .route("/v1/revenue", get(revenue::get_revenue))
        .route(
            "/v1/settlements/purchase",
            post(settlements::post_purchase_settlement),
        )
        .route(
            "/v1/settlements/refund",
            post(settlements::post_refund_settlement),
        )
        .route("/v1/owners", post(owners::upsert_owner_account))
        .layer(cors)
        .with_state(state)
}
