//! Dashboard aggregation against a scripted backend.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use erp_shell_integration_tests::{
    ADMIN, BackendScript, FakeBackend, MANAGER, Reply, STAFF, TestShell, count,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn kpi_values(view: &Value) -> Vec<&str> {
    view["kpis"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tile| tile["value"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_manager_sees_full_dashboard() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(MANAGER).await;

    let (status, html) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("$12,345.60"));
    assert!(html.contains("Espresso Beans"));
    assert!(html.contains("$5,849.25"));
    assert!(!html.contains("No sales data available"));

    let view = shell.dashboard_json(&client).await;
    assert_eq!(kpi_values(&view), vec!["$12,345.60", "87", "14", "3"]);
    assert_eq!(view["complete"], json!(true));
    assert_eq!(view["sources"]["summary"], json!("loaded"));
    assert_eq!(count(&backend.calls.last_window_days), 30);
}

#[tokio::test]
async fn test_staff_gets_zeroed_kpis_and_other_panels() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(STAFF).await;

    let view = shell.dashboard_json(&client).await;
    assert_eq!(kpi_values(&view), vec!["$0.00", "0", "0", "0"]);
    assert_eq!(view["sources"]["summary"], json!("unavailable"));
    assert_eq!(view["top_sellers"]["state"], json!("chart"));
    assert_eq!(view["finance"]["state"], json!("summary"));

    // Permission denials are not retried
    assert_eq!(count(&backend.calls.summary), 1);

    let (status, html) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!html.to_lowercase().contains("error"));
}

#[tokio::test]
async fn test_chart_shows_first_five_products() {
    let products: Vec<Value> = (1..=8)
        .map(|i| json!({ "name": format!("Product {i}"), "total_revenue": 1000 - i * 100 }))
        .collect();
    let script = BackendScript {
        sales: Reply::Json(json!({ "best_selling_products": products })),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let view = shell.dashboard_json(&client).await;
    let names: Vec<&str> = view["top_sellers"]["bars"]
        .as_array()
        .unwrap()
        .iter()
        .map(|bar| bar["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Product 1", "Product 2", "Product 3", "Product 4", "Product 5"]
    );

    let (_, html) = shell.get_text(&client, "/").await;
    assert!(html.contains("Product 5"));
    assert!(!html.contains("Product 6"));
}

#[tokio::test]
async fn test_empty_sales_shows_placeholder() {
    let script = BackendScript {
        sales: Reply::Json(json!({ "total_revenue": 0, "best_selling_products": [] })),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let (_, html) = shell.get_text(&client, "/").await;
    assert!(html.contains("No sales data available"));
    assert!(html.contains("Sales data will appear here once orders are created"));
}

#[tokio::test]
async fn test_missing_net_profit_defaults_to_zero() {
    let script = BackendScript {
        finance: Reply::Json(json!({ "total_revenue": 1500, "total_expenses": 400 })),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let view = shell.dashboard_json(&client).await;
    assert_eq!(
        view["finance"],
        json!({
            "state": "summary",
            "total_revenue": "$1,500.00",
            "total_expenses": "$400.00",
            "net_profit": "$0.00"
        })
    );
}

#[tokio::test]
async fn test_failing_finance_is_retried_then_placeholder() {
    let script = BackendScript {
        finance: Reply::Status(503),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let (status, html) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No financial data available"));
    assert!(html.contains("$12,345.60"));
    assert!(html.contains("Espresso Beans"));
    assert_eq!(count(&backend.calls.finance), 4);
}

#[tokio::test]
async fn test_repeat_render_served_from_cache() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    shell.dashboard_json(&client).await;
    shell.dashboard_json(&client).await;
    let (status, _) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(count(&backend.calls.summary), 1);
    assert_eq!(count(&backend.calls.inventory), 1);
    assert_eq!(count(&backend.calls.sales), 1);
    assert_eq!(count(&backend.calls.finance), 1);
}

#[tokio::test]
async fn test_cache_is_per_user() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;

    let admin = shell.signed_in(ADMIN).await;
    let staff = shell.signed_in(STAFF).await;

    assert_eq!(kpi_values(&shell.dashboard_json(&admin).await)[1], "87");
    assert_eq!(kpi_values(&shell.dashboard_json(&staff).await)[1], "0");
    assert_eq!(count(&backend.calls.summary), 2);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let script = BackendScript {
        finance: Reply::Delayed(Duration::from_secs(5), json!({ "net_profit": 1 })),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start_with(
        &backend,
        &[("ERP_API_TIMEOUT_SECS", "1"), ("QUERY_RETRY_ATTEMPTS", "0")],
    )
    .await;
    let client = shell.signed_in(ADMIN).await;

    let started = Instant::now();
    let view = shell.dashboard_json(&client).await;
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(view["finance"], json!({ "state": "no_data" }));
    assert_eq!(view["sources"]["finance"], json!("unavailable"));
    assert_eq!(view["top_sellers"]["state"], json!("chart"));
}

#[tokio::test]
async fn test_page_renders_before_slow_source_settles() {
    let script = BackendScript {
        finance: Reply::Delayed(Duration::from_secs(3), json!({ "net_profit": 1 })),
        ..BackendScript::default()
    };
    let backend = FakeBackend::start(script).await;
    let shell = TestShell::start_with(&backend, &[("DASHBOARD_RENDER_DEADLINE_MS", "300")]).await;
    let client = shell.signed_in(ADMIN).await;

    let started = Instant::now();
    let (status, html) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(html.contains("$12,345.60"));
    assert!(html.contains("Espresso Beans"));
    assert!(html.contains("Loading financial data"));

    let started = Instant::now();
    let view = shell.dashboard_json(&client).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(view["complete"], json!(false));
    assert_eq!(view["sources"]["finance"], json!("pending"));
    assert_eq!(view["sources"]["sales"], json!("loaded"));
}

#[tokio::test]
async fn test_stream_reports_each_source() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let response = client
        .get(shell.url("/api/dashboard/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let body = response.text().await.unwrap();
    let views: Vec<Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    assert_eq!(body.matches("event: snapshot").count(), 5);
    assert_eq!(views.len(), 5);
    assert_eq!(views[0]["complete"], json!(false));
    assert_eq!(views[0]["sources"]["summary"], json!("pending"));
    assert_eq!(views[4]["complete"], json!(true));
    assert_eq!(kpi_values(&views[4])[0], "$12,345.60");
}
