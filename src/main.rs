//! Visual riddle web service: upload an image, get a riddle about it from a
//! vision-capable model, guess before you reveal.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod caption;
mod config;
mod error;
mod model;
mod page;
mod recover;
mod riddle;

use config::Config;
use model::{OpenAiClient, VisionModel};

pub struct AppState {
    /// `None` when no API key is configured; every API request then gets a
    /// 500 naming the missing variable instead of a startup crash.
    pub model: Option<Arc<dyn VisionModel>>,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/api/riddle", post(riddle::generate_riddle))
        .route("/api/caption", post(caption::caption_image))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ai_image_riddler=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let model: Option<Arc<dyn VisionModel>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiClient::new(
            key.clone(),
            config.model.clone(),
            config.api_base.clone(),
        ))),
        None => {
            tracing::warn!("OPENAI_API_KEY is not set; requests will fail until it is configured");
            None
        }
    };

    let state = Arc::new(AppState { model });
    let addr = format!("0.0.0.0:{}", config.http_port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Could not bind {addr}: {e}"));

    info!("🧩 Riddle server listening on http://{addr}");

    axum::serve(listener, app(state))
        .await
        .expect("server error");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::model::GenerationRequest;

    /// Canned backend: records every call and replies with a fixed string
    /// (or a fixed error).
    struct StubModel {
        reply: Result<String, String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl StubModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VisionModel for StubModel {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow::anyhow!("{message}")),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn router_with(model: Option<Arc<dyn VisionModel>>) -> Router {
        app(Arc::new(AppState { model }))
    }

    fn riddle_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/riddle")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn happy_path_suppresses_solution_fields() {
        let stub = StubModel::replying(
            r#"{"riddle":"R","solution":"S","focus":"F","difficulty":"hard","answer":"X"}"#,
        );
        let router = router_with(Some(stub.clone()));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/png;base64,AAAA","mode":"hard","includeSolution":false}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "ok": true,
                "riddle": "R",
                "focus": "F",
                "difficulty": "hard",
            })
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, 0.9);
        assert_eq!(seen[0].max_output_tokens, 300);
        assert_eq!(seen[0].image_data_url, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn solution_is_included_by_default() {
        let stub = StubModel::replying(
            r#"{"riddle":"R","solution":"S","focus":"F","difficulty":"easy","answer":"X"}"#,
        );
        let router = router_with(Some(stub.clone()));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/jpeg;base64,AAAA","mode":"easy"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["solution"], "S");
        assert_eq!(body["answer"], "X");

        // Easy mode keeps the conservative temperature.
        assert_eq!(stub.seen.lock().unwrap()[0].temperature, 0.6);
    }

    #[tokio::test]
    async fn missing_image_is_a_400_and_never_reaches_the_model() {
        let stub = StubModel::replying("{}");
        let router = router_with(Some(stub.clone()));

        let response = router
            .oneshot(riddle_request(r#"{"mode":"easy"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("imageDataUrl"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_image_data_url_is_rejected() {
        let stub = StubModel::replying("{}");
        let router = router_with(Some(stub.clone()));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:text/plain;base64,AAAA"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_a_400() {
        let router = router_with(Some(StubModel::replying("{}")));

        let response = router
            .oneshot(riddle_request("this is not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Invalid JSON body.");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_500_before_any_model_call() {
        let router = router_with(None);

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/png;base64,AAAA"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn model_failure_is_a_500_with_the_message_forwarded() {
        let stub = StubModel::failing("Model API returned 429: slow down");
        let router = router_with(Some(stub));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/png;base64,AAAA"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Model API returned 429: slow down");
    }

    #[tokio::test]
    async fn prose_wrapped_model_output_still_yields_a_riddle() {
        let stub = StubModel::replying(
            r#"Sure! {"riddle":"A","solution":"B","focus":"C","difficulty":"easy","answer":"D"} Enjoy!"#,
        );
        let router = router_with(Some(stub));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/png;base64,AAAA"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["riddle"], "A");
        assert_eq!(body["difficulty"], "easy");
    }

    #[tokio::test]
    async fn unparseable_model_output_is_still_a_200() {
        let stub = StubModel::replying("not json at all");
        let router = router_with(Some(stub));

        let response = router
            .oneshot(riddle_request(
                r#"{"imageDataUrl":"data:image/png;base64,AAAA","mode":"nightmare"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["riddle"], "not json at all");
        assert_eq!(body["focus"], "unknown");
        // "nightmare" is not a difficulty; it normalizes to medium.
        assert_eq!(body["difficulty"], "medium");
        assert_eq!(body["answer"], "");
    }

    #[tokio::test]
    async fn index_serves_the_page() {
        let router = router_with(None);
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn caption_without_api_key_is_a_500() {
        let router = router_with(None);
        let body = "--BOUNDARY\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nx\r\n--BOUNDARY--\r\n";
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/caption")
                    .header(
                        header::CONTENT_TYPE,
                        "multipart/form-data; boundary=BOUNDARY",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
