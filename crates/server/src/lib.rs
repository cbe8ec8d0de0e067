//! MedSearch HTTP server
//!
//! Actix-web 기반 의약품 검색 API 및 정적 검색 페이지

pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use medsearch_common::{AppConfig, MedSearchError, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub use state::AppState;

/// Build state from `config` and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let state = AppState::new(config)?;
    serve(Arc::new(state)).await
}

/// Serve an already-built state
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let bind_address = state.config.server_bind_address();
    let static_dir = state.config.static_dir.clone();

    if !static_dir.is_dir() {
        warn!(
            "Static directory {} not found; only the JSON API will be served",
            static_dir.display()
        );
    }

    info!(
        "Starting server on http://{} (index: {}, model: {})",
        bind_address,
        state.config.index.name,
        state.retriever.embedder().model_name()
    );

    let data = web::Data::new(state);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(data.clone())
            .configure(routes::configure);

        if static_dir.is_dir() {
            app = app.service(actix_files::Files::new("/static", &static_dir));
        }
        app
    })
    .bind(&bind_address)
    .map_err(|e| MedSearchError::config(format!("Cannot bind {}: {}", bind_address, e)))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
