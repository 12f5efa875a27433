pub mod auth;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod fees;
pub mod handlers;
pub mod services;
pub mod validation;

use axum::{routing::get, Router};

use services::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub transfers: TransferService,
}

impl AppState {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self {
            transfers: TransferService::new(db.clone()),
            db,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/wallets", get(handlers::wallets::list_wallets))
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .with_state(state)
}
