use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::shared::config::Config;

/// Общее состояние приложения, доступное всем обработчикам
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 PRODUCT LIST + FILTER FORM
        // ========================================
        .route(
            "/products",
            get(handlers::a001_product::list_page).post(handlers::a001_product::submit),
        )
        .route(
            "/api/a001/products",
            get(handlers::a001_product::list_products),
        )
        .route(
            "/api/a001/products/filter",
            get(handlers::a001_product::filter_state),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}
