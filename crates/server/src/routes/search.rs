use actix_web::{post, web, HttpRequest, HttpResponse};
use medsearch_vector::{SearchError, SearchOutcome};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::state::AppState;
use crate::types::{ErrorResponse, SearchRequest};

const MISSING_NAME: &str = "Medicine name is required";
const EMBEDDING_FAILED: &str = "Failed to generate embedding for the query";
const CONNECTION_FAILED: &str = "Failed to connect to the vector index";
const INTERNAL_ERROR: &str = "An internal server error occurred. Please try again later.";

/// Medicine lookup
#[post("/search")]
pub async fn search(
    body: web::Json<SearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> HttpResponse {
    let medicine_name = body
        .into_inner()
        .medicine_name
        .unwrap_or_default()
        .trim()
        .to_string();

    match state.retriever.search(&medicine_name).await {
        Ok(SearchOutcome::Found(record)) => HttpResponse::Ok().json(record),
        Ok(SearchOutcome::NotFound) => HttpResponse::NotFound().json(ErrorResponse::new(format!(
            "No information found for '{}'",
            medicine_name
        ))),
        Err(e) => search_error_response(&e),
    }
}

fn search_error_response(err: &SearchError) -> HttpResponse {
    match err {
        SearchError::MissingQuery => HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_NAME)),
        SearchError::Embedding(e) => {
            warn!("Embedding failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(EMBEDDING_FAILED))
        }
        SearchError::StoreConnection(e) => {
            error!("Vector store connection failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(CONNECTION_FAILED))
        }
        SearchError::Store(e) => {
            error!("An error occurred during search: {:?}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(INTERNAL_ERROR))
        }
    }
}

/// Unreadable request bodies are reported like a missing name
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        info!("Rejected search body: {}", err);
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_NAME));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use crate::test_support::{state_with, FakeEmbedder};
    use actix_web::{http::StatusCode, test, App};
    use medsearch_vector::{InMemoryStore, ResponseRecord, NO_USES};

    async fn call(state: AppState, body: &str) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(state)))
                .configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/search")
            .insert_header(("content-type", "application/json"))
            .set_payload(body.to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_found() {
        let store = InMemoryStore::new(FakeEmbedder::DIM);
        let state = state_with(FakeEmbedder::ok(), store.clone(), false);
        crate::test_support::seed(&store, "X1", "Paracetamol", &[("substitute0", "Crocin")]).await;

        let (status, body) = call(state, r#"{"medicine_name": "  Paracetamol "}"#).await;
        assert_eq!(status, StatusCode::OK);

        let record: ResponseRecord = serde_json::from_value(body).unwrap();
        assert_eq!(record.id, "X1");
        assert_eq!(record.name, "Paracetamol");
        assert_eq!(record.substitutes, vec!["Crocin"]);
        assert_eq!(record.uses, vec![NO_USES]);
        assert_eq!(record.match_score.len(), 4);
    }

    #[actix_web::test]
    async fn test_missing_name() {
        for body in [r#"{}"#, r#"{"medicine_name": "   "}"#, r#"{"medicine_name": null}"#, "not json"] {
            let state = state_with(FakeEmbedder::ok(), InMemoryStore::new(FakeEmbedder::DIM), false);
            let (status, json) = call(state, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body={}", body);
            assert_eq!(json["error"], MISSING_NAME);
        }
    }

    #[actix_web::test]
    async fn test_not_found() {
        let state = state_with(FakeEmbedder::ok(), InMemoryStore::new(FakeEmbedder::DIM), false);
        let (status, json) = call(state, r#"{"medicine_name": "Dolo"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "No information found for 'Dolo'");
    }

    #[actix_web::test]
    async fn test_embedding_failure() {
        let state = state_with(FakeEmbedder::failing(), InMemoryStore::new(FakeEmbedder::DIM), false);
        let (status, json) = call(state, r#"{"medicine_name": "Dolo"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], EMBEDDING_FAILED);
    }

    #[actix_web::test]
    async fn test_connection_failure() {
        let state = state_with(FakeEmbedder::ok(), InMemoryStore::new(FakeEmbedder::DIM), true);
        let (status, json) = call(state, r#"{"medicine_name": "Dolo"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], CONNECTION_FAILED);
    }

    #[actix_web::test]
    async fn test_store_failure_is_generic() {
        // Store built for another dimension rejects every query
        let state = state_with(FakeEmbedder::ok(), InMemoryStore::new(FakeEmbedder::DIM + 1), false);
        let (status, json) = call(state, r#"{"medicine_name": "Dolo"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], INTERNAL_ERROR);
    }
}
