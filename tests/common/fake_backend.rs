//! Fake recommendation backend for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1 serving `POST /api/recomendar`. The response is programmable
//! per test (a ranked list, an error status, or a raw body), and every
//! request body is recorded so tests can assert on the exact wire shape.
//!
//! # Example
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use common::fake_backend::FakeBackend;
//!
//! let backend = FakeBackend::start().await.unwrap();
//! backend.respond_raw(r#"[{"entidad":"INVIAS","score":0.87}]"#).await;
//!
//! // Point the client under test at backend.base_url()
//! let url = backend.base_url();
//! # });
//! ```

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// What the next `POST /api/recomendar` should return.
#[derive(Clone)]
enum Reply {
    /// 200 with the given JSON body.
    Body(String),
    /// The given status with an empty body.
    Status(StatusCode),
}

/// State shared between the router and test code.
struct BackendState {
    reply: Reply,
    /// Decoded request bodies, in arrival order.
    requests: Vec<serde_json::Value>,
}

/// Handle to the running fake recommendation backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    /// Start the fake backend on a random port. Returns once the server is
    /// listening. The default reply is an empty recommendation list.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(BackendState {
            reply: Reply::Body("[]".to_string()),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/recomendar", post(recommend))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the backend API (e.g. `http://127.0.0.1:PORT/api`).
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Respond to subsequent requests with this ranked list.
    pub async fn respond_with(&self, recommendations: &[(&str, f64)]) {
        let body: Vec<serde_json::Value> = recommendations
            .iter()
            .map(|(entidad, score)| serde_json::json!({"entidad": entidad, "score": score}))
            .collect();
        self.state.lock().await.reply =
            Reply::Body(serde_json::Value::Array(body).to_string());
    }

    /// Respond to subsequent requests with this raw body and a 200 status.
    pub async fn respond_raw(&self, body: &str) {
        self.state.lock().await.reply = Reply::Body(body.to_string());
    }

    /// Respond to subsequent requests with this status and an empty body.
    pub async fn respond_status(&self, status: StatusCode) {
        self.state.lock().await.reply = Reply::Status(status);
    }

    /// Every request body received so far, decoded as JSON, in arrival order.
    pub async fn recorded_requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.requests.clone()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

// ---------------------------------------------------------------------------
// Route handler
// ---------------------------------------------------------------------------

async fn recommend(
    State(state): State<Arc<Mutex<BackendState>>>,
    body: String,
) -> impl IntoResponse {
    let mut state = state.lock().await;

    // Record whatever arrived, even if it is not valid JSON, so a test that
    // broke the body shape fails on the assertion rather than silently.
    let decoded = serde_json::from_str(&body)
        .unwrap_or_else(|_| serde_json::Value::String(body.clone()));
    state.requests.push(decoded);

    match state.reply.clone() {
        Reply::Body(json) => (
            StatusCode::OK,
            [("content-type", "application/json")],
            json,
        )
            .into_response(),
        Reply::Status(status) => (status, String::new()).into_response(),
    }
}
