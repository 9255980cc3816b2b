use axum::http::{header, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::middleware::require_bearer;
use crate::middleware::security_headers::security_headers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // The browser client is served from elsewhere, so any origin may call us.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let protected = api::protected_router()
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .merge(api::public_router())
        .merge(protected)
        .layer(from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use pilgrim_core::metrics::snapshot_with;
    use pilgrim_core::{
        DashboardSnapshot, Gateway, GenerateRequest, LlmClient, LlmError, MetricsProvider,
        MockMetrics, Persona,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::credentials::PlainCredential;
    use crate::auth::session::{MemorySessionStore, SessionStore};
    use crate::config::ServerConfig;

    const BODY_LIMIT: usize = 1_048_576;
    const RAW_UPSTREAM_ERROR: &str = "RESOURCE_EXHAUSTED: key AIza-leaked quota";

    /// Upstream stand-in: records each request and answers with a fixed reply.
    struct FakeGemini {
        reply: Option<String>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl FakeGemini {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for FakeGemini {
        async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push((
                request.system_instruction.to_string(),
                request.prompt.to_string(),
            ));
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Status {
                    status: 429,
                    body: RAW_UPSTREAM_ERROR.to_string(),
                }),
            }
        }
    }

    /// Counts how often the dashboard handler actually ran.
    #[derive(Default)]
    struct SpyMetrics {
        calls: AtomicUsize,
    }

    impl MetricsProvider for SpyMetrics {
        fn snapshot(&self) -> DashboardSnapshot {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            snapshot_with(&mut StdRng::seed_from_u64(n as u64))
        }
    }

    struct Harness {
        app: Router,
        sessions: Arc<MemorySessionStore>,
        llm: Arc<FakeGemini>,
        metrics: Arc<SpyMetrics>,
    }

    fn harness(llm: Arc<FakeGemini>) -> Harness {
        let sessions = Arc::new(MemorySessionStore::new(None));
        let metrics = Arc::new(SpyMetrics::default());
        let state = AppState {
            config: Arc::new(ServerConfig::default()),
            sessions: sessions.clone(),
            credentials: Arc::new(PlainCredential::new("admin@pilgrimpath.com", "admin")),
            gateway: Gateway::new(llm.clone(), "gemini-2.5-flash"),
            metrics: metrics.clone(),
        };
        Harness {
            app: build_router(state),
            sessions,
            llm,
            metrics,
        }
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({ "email": "admin@pilgrimpath.com", "password": "admin" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn login_issues_registered_token() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({ "email": "admin@pilgrimpath.com", "password": "admin" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Admin login successful");
        let token = body["token"].as_str().unwrap();
        assert_eq!(token.len(), 64);
        assert!(h.sessions.validate(token));
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected_without_issuing() {
        let h = harness(FakeGemini::replying("unused"));

        for (email, password) in [
            ("admin@pilgrimpath.com", "wrong"),
            ("someone@pilgrimpath.com", "admin"),
            ("", ""),
        ] {
            let response = h
                .app
                .clone()
                .oneshot(post_json(
                    "/login",
                    json!({ "email": email, "password": password }),
                    None,
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = json_body(response).await;
            assert_eq!(body["message"], "Invalid credentials");
            assert!(body.get("token").is_none());
        }
        assert!(h.sessions.is_empty());
    }

    #[tokio::test]
    async fn login_without_fields_is_bad_request() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(post_json("/login", json!({ "email": "admin@pilgrimpath.com" }), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.sessions.is_empty());
    }

    #[tokio::test]
    async fn dashboard_without_header_is_401_and_handler_not_run() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth("/api/dashboard-data", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["message"],
            "Access denied. No token provided."
        );
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dashboard_with_non_bearer_header_is_401() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth("/api/dashboard-data", Some("Basic YWRtaW46YWRtaW4=")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dashboard_with_unregistered_token_is_403_and_handler_not_run() {
        let h = harness(FakeGemini::replying("unused"));
        login(&h.app).await;

        let forged = format!("Bearer {}", "ab".repeat(32));
        let response = h
            .app
            .clone()
            .oneshot(get_with_auth("/api/dashboard-data", Some(&forged)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await["message"],
            "Access denied. Invalid token."
        );
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dashboard_with_valid_token_returns_snapshot() {
        let h = harness(FakeGemini::replying("unused"));
        let token = login(&h.app).await;

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth(
                "/api/dashboard-data",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["liveCrowdCount"].as_str().unwrap().starts_with('~'));
        assert!(body["crowdChange"].as_str().unwrap().ends_with('%'));
        assert_eq!(body["incidentsChangeType"], "increase");
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dashboard_draws_fresh_snapshot_each_call() {
        let h = harness(FakeGemini::replying("unused"));
        let token = login(&h.app).await;
        let auth = format!("Bearer {token}");

        for _ in 0..2 {
            let response = h
                .app
                .clone()
                .oneshot(get_with_auth("/api/dashboard-data", Some(&auth)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn public_ask_returns_upstream_text() {
        let h = harness(FakeGemini::replying("hi there"));

        let response = h
            .app
            .clone()
            .oneshot(post_json(
                "/api/ask-gemini-public",
                json!({ "prompt": "hello" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "text": "hi there" }));
        assert_eq!(
            h.llm.requests(),
            vec![(
                Persona::PilgrimGuide.system_instruction().to_string(),
                "hello".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn public_ask_with_empty_body_is_400() {
        let h = harness(FakeGemini::replying("unused"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/ask-gemini-public")
            .body(Body::empty())
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("Prompt is required"));
        assert!(h.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn public_ask_with_empty_prompt_is_400() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(post_json("/api/ask-gemini-public", json!({ "prompt": "" }), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let h = harness(FakeGemini::replying("unused"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/ask-gemini-public")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"prompt\": "))
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn admin_ask_requires_token() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(post_json("/api/ask-gemini", json!({ "prompt": "hello" }), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(h.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn admin_ask_uses_analyst_persona() {
        let h = harness(FakeGemini::replying("Crowds peak at 6am."));
        let token = login(&h.app).await;

        let response = h
            .app
            .clone()
            .oneshot(post_json(
                "/api/ask-gemini",
                json!({ "prompt": "When do crowds peak?" }),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["text"], "Crowds peak at 6am.");
        assert_eq!(
            h.llm.requests()[0].0,
            Persona::AdminAnalyst.system_instruction()
        );
    }

    #[tokio::test]
    async fn admin_ask_upstream_failure_is_500_without_raw_error() {
        let h = harness(FakeGemini::failing());
        let token = login(&h.app).await;

        let response = h
            .app
            .clone()
            .oneshot(post_json(
                "/api/ask-gemini",
                json!({ "prompt": "hello" }),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains(RAW_UPSTREAM_ERROR));
        assert!(!text.contains("RESOURCE_EXHAUSTED"));
        assert!(text.contains("Error contacting the Gemini API."));
    }

    #[tokio::test]
    async fn public_ask_upstream_failure_is_500() {
        let h = harness(FakeGemini::failing());

        let response = h
            .app
            .clone()
            .oneshot(post_json("/api/ask-gemini-public", json!({ "prompt": "hello" }), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["message"],
            "Error contacting the Gemini API."
        );
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let h = harness(FakeGemini::replying("unused"));
        let token = login(&h.app).await;
        let auth = format!("Bearer {token}");

        let response = h
            .app
            .clone()
            .oneshot(post_json("/logout", json!({}), Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!h.sessions.validate(&token));

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth("/api/dashboard-data", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let h = harness(FakeGemini::replying("unused"));

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth("/api/dashboard-data", None))
            .await
            .unwrap();

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn production_metrics_provider_plugs_in() {
        let mut h = harness(FakeGemini::replying("unused"));
        let state = AppState {
            config: Arc::new(ServerConfig::default()),
            sessions: h.sessions.clone(),
            credentials: Arc::new(PlainCredential::new("admin@pilgrimpath.com", "admin")),
            gateway: Gateway::new(h.llm.clone(), "gemini-2.5-flash"),
            metrics: Arc::new(MockMetrics),
        };
        h.app = build_router(state);
        let token = login(&h.app).await;

        let response = h
            .app
            .clone()
            .oneshot(get_with_auth(
                "/api/dashboard-data",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.metrics.calls.load(Ordering::SeqCst), 0);
    }
}
