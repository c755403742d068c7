//! Integration tests for the ERP shell.
//!
//! Each test starts a scripted fake ERP backend and the shell router, both
//! bound to ephemeral ports on 127.0.0.1, and drives the shell over HTTP with
//! a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p erp-shell-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use erp_shell_web::config::ShellConfig;
use erp_shell_web::state::AppState;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

/// Password accepted for every scripted user.
pub const PASSWORD: &str = "correct-horse-battery";

pub const ADMIN: &str = "admin@example.com";
pub const MANAGER: &str = "manager@example.com";
pub const STAFF: &str = "staff@example.com";
/// A user whose backend record carries no role.
pub const UNASSIGNED: &str = "unassigned@example.com";

/// How a scripted analytics endpoint answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with this body.
    Json(Value),
    /// This status with a FastAPI-style `detail` body.
    Status(u16),
    /// 200 with this body after a delay.
    Delayed(Duration, Value),
}

impl Reply {
    async fn respond(&self) -> Response {
        match self {
            Self::Json(body) => Json(body.clone()).into_response(),
            Self::Status(code) => {
                let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(json!({ "detail": "scripted failure" }))).into_response()
            }
            Self::Delayed(delay, body) => {
                tokio::time::sleep(*delay).await;
                Json(body.clone()).into_response()
            }
        }
    }
}

/// Data served by the fake backend.
#[derive(Debug, Clone)]
pub struct BackendScript {
    /// KPI object returned to Admin and Manager callers.
    pub kpis: Value,
    pub inventory: Reply,
    pub sales: Reply,
    pub finance: Reply,
}

impl Default for BackendScript {
    fn default() -> Self {
        Self {
            kpis: json!({
                "total_revenue_30d": 12345.6,
                "order_count_30d": 87,
                "active_employees": 14,
                "low_stock_items": 3
            }),
            inventory: Reply::Json(json!({
                "total_products": 120,
                "total_stock_value": 45210.25,
                "low_stock_count": 3,
                "out_of_stock_count": 1
            })),
            sales: Reply::Json(json!({
                "total_revenue": 9100.0,
                "total_orders": 87,
                "best_selling_products": [
                    { "name": "Espresso Beans", "total_revenue": 4200.0, "total_quantity": 210 },
                    { "name": "Pour-over Kit", "total_revenue": 2900.5, "total_quantity": 58 },
                    { "name": "Grinder", "total_revenue": 2000.0, "total_quantity": 10 }
                ]
            })),
            finance: Reply::Json(json!({
                "total_revenue": 9100.0,
                "total_expenses": 3250.75,
                "net_profit": 5849.25,
                "period_start": "2026-09-16",
                "period_end": "2026-10-16"
            })),
        }
    }
}

/// Per-endpoint request counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub login: AtomicU32,
    pub me: AtomicU32,
    pub summary: AtomicU32,
    pub inventory: AtomicU32,
    pub sales: AtomicU32,
    pub finance: AtomicU32,
    /// `days` parameter of the most recent sales or finance request.
    pub last_window_days: AtomicU32,
}

/// Read a counter.
pub fn count(counter: &AtomicU32) -> u32 {
    counter.load(Ordering::SeqCst)
}

struct Fake {
    script: BackendScript,
    users: HashMap<&'static str, Option<&'static str>>,
    calls: Arc<CallCounts>,
}

impl Fake {
    /// Resolve the bearer token to `(email, role_name)`.
    fn caller(&self, headers: &HeaderMap) -> Option<(&'static str, Option<&'static str>)> {
        let email = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer token-")?;
        self.users
            .get_key_value(email)
            .map(|(email, role)| (*email, *role))
    }
}

/// A running fake ERP backend.
pub struct FakeBackend {
    pub url: String,
    pub calls: Arc<CallCounts>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct WindowQuery {
    days: u32,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

async fn login(State(fake): State<Arc<Fake>>, Json(body): Json<LoginBody>) -> Response {
    fake.calls.login.fetch_add(1, Ordering::SeqCst);
    if body.password == PASSWORD && fake.users.contains_key(body.email.as_str()) {
        Json(json!({ "access_token": format!("token-{}", body.email), "token_type": "bearer" }))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
            .into_response()
    }
}

async fn me(State(fake): State<Arc<Fake>>, headers: HeaderMap) -> Response {
    fake.calls.me.fetch_add(1, Ordering::SeqCst);
    match fake.caller(&headers) {
        Some((email, role_name)) => {
            Json(json!({ "email": email, "full_name": null, "role_name": role_name }))
                .into_response()
        }
        None => unauthorized(),
    }
}

async fn summary(State(fake): State<Arc<Fake>>, headers: HeaderMap) -> Response {
    fake.calls.summary.fetch_add(1, Ordering::SeqCst);
    match fake.caller(&headers) {
        Some((_, Some("Admin" | "Manager"))) => {
            Json(json!({ "kpis": fake.script.kpis })).into_response()
        }
        Some(_) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "Not enough permissions" })),
        )
            .into_response(),
        None => unauthorized(),
    }
}

async fn inventory(State(fake): State<Arc<Fake>>, headers: HeaderMap) -> Response {
    fake.calls.inventory.fetch_add(1, Ordering::SeqCst);
    if fake.caller(&headers).is_none() {
        return unauthorized();
    }
    fake.script.inventory.respond().await
}

async fn sales(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Query(query): Query<WindowQuery>,
) -> Response {
    fake.calls.sales.fetch_add(1, Ordering::SeqCst);
    fake.calls.last_window_days.store(query.days, Ordering::SeqCst);
    if fake.caller(&headers).is_none() {
        return unauthorized();
    }
    fake.script.sales.respond().await
}

async fn finance(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Query(query): Query<WindowQuery>,
) -> Response {
    fake.calls.finance.fetch_add(1, Ordering::SeqCst);
    fake.calls.last_window_days.store(query.days, Ordering::SeqCst);
    if fake.caller(&headers).is_none() {
        return unauthorized();
    }
    fake.script.finance.respond().await
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    format!("http://{addr}")
}

impl FakeBackend {
    /// Start a fake backend serving `script`.
    pub async fn start(script: BackendScript) -> Self {
        let calls = Arc::new(CallCounts::default());
        let fake = Arc::new(Fake {
            script,
            users: HashMap::from([
                (ADMIN, Some("Admin")),
                (MANAGER, Some("Manager")),
                (STAFF, Some("Staff")),
                (UNASSIGNED, None),
            ]),
            calls: Arc::clone(&calls),
        });

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/auth/dashboard", get(summary))
            .route("/api/inventory/analytics", get(inventory))
            .route("/api/sales/analytics", get(sales))
            .route("/api/finance/dashboard", get(finance))
            .with_state(fake);

        Self {
            url: serve(router).await,
            calls,
        }
    }
}

/// A running shell pointed at a [`FakeBackend`].
pub struct TestShell {
    pub url: String,
    pub state: AppState,
}

impl TestShell {
    /// Start the shell with fast retries.
    pub async fn start(backend: &FakeBackend) -> Self {
        Self::start_with(backend, &[]).await
    }

    /// Start the shell with extra environment overrides.
    pub async fn start_with(backend: &FakeBackend, overrides: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = [
            ("SHELL_BASE_URL", "http://127.0.0.1"),
            ("ERP_API_URL", backend.url.as_str()),
            ("ERP_API_TIMEOUT_SECS", "5"),
            ("QUERY_RETRY_BASE_DELAY_MS", "0"),
            ("DASHBOARD_RENDER_DEADLINE_MS", "5000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.extend(overrides.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let config =
            ShellConfig::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
        let state = AppState::new(config).expect("Failed to create application state");

        Self {
            url: serve(erp_shell_web::app(state.clone())).await,
            state,
        }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// Sign `email` in on `client`.
    pub async fn login(&self, client: &Client, email: &str) -> reqwest::Response {
        client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("Failed to post login form")
    }

    /// Sign `email` in on a fresh client and return it.
    pub async fn signed_in(&self, email: &str) -> Client {
        let client = browser();
        let response = self.login(&client, email).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::SEE_OTHER,
            "login for {email} should redirect"
        );
        client
    }

    /// GET `path` and return the status and body.
    pub async fn get_text(&self, client: &Client, path: &str) -> (reqwest::StatusCode, String) {
        let response = client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        (status, response.text().await.expect("Failed to read body"))
    }

    /// GET `/api/dashboard` and parse it.
    pub async fn dashboard_json(&self, client: &Client) -> Value {
        let response = client
            .get(self.url("/api/dashboard"))
            .send()
            .await
            .expect("Failed to fetch dashboard JSON");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Dashboard JSON did not parse")
    }
}

/// A client that keeps cookies and does not follow redirects.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Value of the `Location` header.
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
