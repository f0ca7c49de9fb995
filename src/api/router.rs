//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::application::ReadmissionService;

/// Optional route groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Mount `POST /admin/reload-dimensions`
    pub enable_reload: bool,
}

/// Build the API router around a shared service.
pub fn api_router(service: Arc<ReadmissionService>, options: RouterOptions) -> Router {
    build_router(ApiContext::new(service), options)
}

fn build_router(ctx: ApiContext, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(endpoints::health::check))
        .route("/metadata", get(endpoints::dimensions::metadata))
        .route("/predict", post(endpoints::predict::predict))
        .route("/model", get(endpoints::model::info));

    if options.enable_reload {
        router = router.route(
            "/admin/reload-dimensions",
            post(endpoints::dimensions::reload),
        );
    }

    router.with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStore;
    use crate::application::dimensions::tests::seeded_store;
    use crate::application::prediction::tests::{stump_classifier, FixedClassifier};
    use crate::application::readmission::tests::service_with;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    fn app_with(store: Arc<SqliteStore>, enable_reload: bool) -> Router {
        let service = service_with(Arc::new(stump_classifier()), store);
        api_router(Arc::new(service), RouterOptions { enable_reload })
    }

    fn app() -> Router {
        app_with(Arc::new(seeded_store()), false)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Should build request")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Should build request")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("Should read body");
        serde_json::from_slice(&body).expect("Should be JSON")
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let response = app().oneshot(get_request("/healthz")).await.expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn metadata_lists_sorted_labels() {
        let response = app().oneshot(get_request("/metadata")).await.expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["genders"], serde_json::json!(["f", "m"]));
        assert_eq!(json["races"], serde_json::json!(["black", "white"]));
        assert_eq!(json["ethnicities"], serde_json::json!(["hispanic", "nonhispanic"]));
    }

    #[tokio::test]
    async fn predict_returns_probability() {
        let body = r#"{"age": 70, "gender": "M", "num_meds": 9, "has_diabetes": true, "note": "ignored"}"#;
        let response = app()
            .oneshot(post_json("/predict", body))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let p = json["readmission_probability"].as_f64().expect("Should be a number");
        assert!((0.0..=1.0).contains(&p));
        assert!(p > 0.5);
        assert_eq!(json["risk_band"], "high");
    }

    #[tokio::test]
    async fn predict_accepts_empty_object() {
        let response = app()
            .oneshot(post_json("/predict", "{}"))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["readmission_probability"].is_number());
    }

    #[tokio::test]
    async fn predict_rejects_malformed_payloads() {
        for body in ["not json", "[1, 2, 3]", r#"{"gender": 5}"#] {
            let response = app()
                .oneshot(post_json("/predict", body))
                .await
                .expect("Should respond");
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
            let json = body_json(response).await;
            assert_eq!(json["error"]["code"], "INVALID_PAYLOAD");
        }
    }

    #[tokio::test]
    async fn model_reports_artifact_metadata() {
        let service = service_with(Arc::new(stump_classifier()), Arc::new(seeded_store()));
        let loaded_at = service.model_info().loaded_at;
        let app = api_router(Arc::new(service), RouterOptions::default());

        let response = app.oneshot(get_request("/model")).await.expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "gradient_boosted_trees");
        assert_eq!(json["schema_version"], "readmission-v1");
        assert_eq!(json["feature_names"].as_array().map(Vec::len), Some(22));
        assert_eq!(json["sha256"].as_str().map(str::len), Some(64));
        assert_eq!(
            json["loaded_at"],
            serde_json::to_value(loaded_at).expect("Should serialize")
        );
    }

    #[tokio::test]
    async fn reload_route_disabled_by_default() {
        let response = app()
            .oneshot(post_json("/admin/reload-dimensions", ""))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reload_route_swaps_lookups() {
        let store = Arc::new(seeded_store());
        let app = app_with(Arc::clone(&store), true);

        store
            .execute_batch("INSERT INTO clinical.gender_dim VALUES (3, 'Unknown');")
            .expect("Should insert");

        let response = app
            .clone()
            .oneshot(post_json("/admin/reload-dimensions", ""))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["genders"], 3);

        let response = app.oneshot(get_request("/metadata")).await.expect("Should respond");
        assert_eq!(
            body_json(response).await["genders"],
            serde_json::json!(["f", "m", "unknown"])
        );
    }

    #[tokio::test]
    async fn reload_store_failure_returns_503() {
        let store = Arc::new(seeded_store());
        let app = app_with(Arc::clone(&store), true);

        store
            .execute_batch("DROP TABLE clinical.race_dim;")
            .expect("Should drop");

        let response = app
            .clone()
            .oneshot(post_json("/admin/reload-dimensions", ""))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "STORE_UNAVAILABLE");

        let response = app.oneshot(get_request("/metadata")).await.expect("Should respond");
        assert_eq!(
            body_json(response).await["races"],
            serde_json::json!(["black", "white"])
        );
    }

    #[tokio::test]
    async fn fixed_classifier_probability_passes_through() {
        let service = service_with(Arc::new(FixedClassifier(0.42)), Arc::new(seeded_store()));
        let app = api_router(Arc::new(service), RouterOptions::default());
        let response = app
            .oneshot(post_json("/predict", r#"{"race": "martian"}"#))
            .await
            .expect("Should respond");
        let json = body_json(response).await;
        assert_eq!(json["readmission_probability"], 0.42);
        assert_eq!(json["risk_band"], "moderate");
    }
}
