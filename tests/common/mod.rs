#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tradebook::config::Config;
use tradebook::db::Store;
use tradebook::router::{TradebookState, tradebook_router};
use tradebook::service::mailer::MailClient;

pub const OFFICE_KEY: &str = "pwd";
pub const CRON_SECRET: &str = "cron-s3cret";

/// Messages received by the stand-in mail provider.
pub type Outbox = Arc<Mutex<Vec<Value>>>;
/// `Idempotency-Key` of every request the provider saw, accepted or not.
pub type Hits = Arc<Mutex<Vec<Option<String>>>>;

#[derive(Clone)]
struct Provider {
    outbox: Outbox,
    hits: Hits,
}

impl Provider {
    /// Records the attempt and returns how many came before it.
    fn hit(&self, headers: &HeaderMap) -> usize {
        let key = headers
            .get("idempotency-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut hits = self.hits.lock().expect("hits poisoned");
        hits.push(key);
        hits.len() - 1
    }

    fn accept(&self, body: Value) -> Json<Value> {
        let mut guard = self.outbox.lock().expect("outbox poisoned");
        guard.push(body);
        Json(json!({ "id": format!("msg-{}", guard.len()) }))
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: Store,
    pub outbox: Outbox,
    pub hits: Hits,
    pub config: Arc<Config>,
}

async fn accept_mail(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    provider.hit(&headers);
    provider.accept(body)
}

/// Fails the first attempt with a 503, then behaves.
async fn flaky_mail(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if provider.hit(&headers) == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "try again" })),
        )
            .into_response();
    }
    provider.accept(body).into_response()
}

/// Takes the message, then answers too late.
async fn slow_mail(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    provider.hit(&headers);
    let receipt = provider.accept(body);
    tokio::time::sleep(Duration::from_millis(500)).await;
    receipt
}

async fn reject_mail() -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "name": "validation_error", "message": "Invalid `to` field." })),
    )
}

/// Local HTTP server speaking the provider's send API.
async fn spawn_mail_provider(outbox: Outbox, hits: Hits) -> String {
    let app = Router::new()
        .route("/emails", post(accept_mail))
        .route("/rejecting/emails", post(reject_mail))
        .route("/flaky/emails", post(flaky_mail))
        .route("/slow/emails", post(slow_mail))
        .with_state(Provider { outbox, hits });
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind provider listener");
    let addr = listener.local_addr().expect("provider has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("provider server failed");
    });
    format!("http://{addr}")
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Build the router over a fresh in-memory database; `tweak` adjusts the config first.
pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let provider = spawn_mail_provider(outbox.clone(), hits.clone()).await;

    let mut cfg = Config::default();
    cfg.basic.office_key = Some(OFFICE_KEY.to_string());
    cfg.basic.body_limit_mb = 1;
    cfg.mail.api_url = format!("{provider}/emails").parse().expect("provider url");
    cfg.mail.api_key = Some("re_test".to_string());
    cfg.mail.retry_times = 0;
    cfg.mail.requests_per_second = 100;
    cfg.digest.cron_secret = Some(CRON_SECRET.to_string());
    cfg.digest.recipients = "ops@example.mv, boss@example.mv".to_string();
    tweak(&mut cfg);

    let store = Store::connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory store");
    let mailer = MailClient::new(&cfg.mail).expect("failed to build mail client");
    let config = Arc::new(cfg);
    let state = TradebookState::new(store.clone(), mailer, config.clone());
    TestApp {
        app: tradebook_router(state),
        store,
        outbox,
        hits,
        config,
    }
}

impl TestApp {
    pub async fn raw(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        (status, body.to_vec())
    }

    /// Authenticated JSON call.
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-office-key", OFFICE_KEY);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");
        let (status, bytes) = self.raw(req).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    pub async fn create_order(&self, body: Value) -> Value {
        let (status, order) = self.call("POST", "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create order failed: {order}");
        order
    }

    pub fn sent(&self) -> Vec<Value> {
        self.outbox.lock().expect("outbox poisoned").clone()
    }

    pub fn attempts(&self) -> Vec<Option<String>> {
        self.hits.lock().expect("hits poisoned").clone()
    }
}
