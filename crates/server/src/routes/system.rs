use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness probe; does not contact the vector store
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let embedder = state.retriever.embedder();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        embedding_model: embedder.model_name().to_string(),
        index_name: state.config.index.name.clone(),
        dimension: embedder.dimension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with, FakeEmbedder};
    use actix_web::{test, App};
    use medsearch_vector::InMemoryStore;

    #[actix_web::test]
    async fn test_health() {
        // Refusing connector proves the probe never reaches the store
        let state = state_with(FakeEmbedder::ok(), InMemoryStore::new(FakeEmbedder::DIM), true);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(state)))
                .service(health),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.embedding_model, "fake");
        assert_eq!(body.index_name, "medicine-info");
        assert_eq!(body.dimension, FakeEmbedder::DIM);
    }
}
