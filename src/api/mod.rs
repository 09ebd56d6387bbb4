// ============================================================================
// HTTP API
// ============================================================================
//
// Thin actix-web layer over the ledger services. Authentication happens
// upstream; the caller's role arrives in the X-Actor-Role header.
//
// ============================================================================

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;

use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use crate::event_sourcing::EventStore;
use crate::ledger::{AccountBook, CatalogAdmin, FulfillmentController, OrderLedger};
use crate::metrics::Metrics;
use crate::utils::RetryConfig;
use handlers::{accounts, orders, products, system};

pub use error::{ApiError, ApiResult};
pub use extract::{ActingRole, ROLE_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub ledger: Arc<OrderLedger>,
    pub fulfillment: FulfillmentController,
    pub accounts: AccountBook,
    pub catalog_admin: CatalogAdmin,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, metrics: Arc<Metrics>, retry: RetryConfig) -> Self {
        let ledger = Arc::new(OrderLedger::new(store.clone(), metrics).with_retry(retry));
        Self {
            fulfillment: FulfillmentController::new(ledger.clone()),
            accounts: AccountBook::new(store.clone()),
            catalog_admin: CatalogAdmin::new(store.clone()),
            ledger,
            store,
        }
    }
}

/// Register state, extractor error handling and every route
pub fn configure(cfg: &mut web::ServiceConfig, state: AppState) {
    cfg.app_data(web::Data::new(state))
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
        )
        .route("/health", web::get().to(system::health))
        // Accounts
        .route("/accounts", web::post().to(accounts::open))
        .route("/accounts/{id}", web::get().to(accounts::get))
        .route("/accounts/{id}/address", web::put().to(accounts::set_address))
        .route("/accounts/{id}/points", web::post().to(accounts::grant_points))
        .route("/accounts/{id}/orders", web::get().to(accounts::list_orders))
        // Products
        .route("/products", web::post().to(products::register))
        .route("/products/{id}", web::get().to(products::get))
        .route("/products/{id}/prices", web::put().to(products::change_prices))
        .route("/products/{id}/restock", web::post().to(products::restock))
        // Orders
        .route("/cart/quote", web::post().to(orders::quote))
        .service(
            web::resource("/orders")
                .route(web::post().to(orders::checkout))
                .route(web::get().to(orders::queue)),
        )
        .route("/orders/{id}", web::get().to(orders::get))
        .route("/orders/{id}/ship", web::post().to(orders::ship))
        .route("/orders/{id}/deliver", web::post().to(orders::deliver))
        .route("/orders/{id}/cancel", web::post().to(orders::cancel))
        .route("/sales/summary", web::get().to(orders::sales_summary));
}

/// Run the API server until shutdown
pub async fn serve(state: AppState, host: String, port: u16) -> std::io::Result<()> {
    tracing::info!("🏀 Starting ledger API on http://{}:{}", host, port);

    HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| configure(cfg, state))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
