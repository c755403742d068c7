//! Role-filtered navigation and section gating.

#![allow(clippy::unwrap_used)]

use erp_shell_integration_tests::{
    ADMIN, BackendScript, FakeBackend, MANAGER, STAFF, TestShell, UNASSIGNED, browser, location,
};
use reqwest::StatusCode;

fn nav_hrefs(html: &str) -> Vec<&str> {
    html.split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|href| !href.starts_with("/static"))
        .collect()
}

#[tokio::test]
async fn test_manager_frame_hides_admin() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(MANAGER).await;

    let (status, html) = shell.get_text(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        nav_hrefs(&html),
        vec!["/", "/inventory", "/sales", "/employees", "/finance", "/ai-chat"]
    );
    assert!(html.contains("Role: Manager"));
    assert!(html.contains("manager@example.com"));
}

#[tokio::test]
async fn test_admin_frame_lists_every_entry() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(ADMIN).await;

    let (_, html) = shell.get_text(&client, "/").await;
    assert_eq!(
        nav_hrefs(&html),
        vec![
            "/",
            "/inventory",
            "/sales",
            "/employees",
            "/finance",
            "/admin",
            "/ai-chat"
        ]
    );
    assert!(html.contains("Role: Admin"));
}

#[tokio::test]
async fn test_missing_role_resolves_to_staff() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(UNASSIGNED).await;

    let (_, html) = shell.get_text(&client, "/").await;
    assert!(!nav_hrefs(&html).contains(&"/admin"));
    assert!(html.contains("Role: Staff"));
}

#[tokio::test]
async fn test_admin_section_is_gated() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;

    let manager = shell.signed_in(MANAGER).await;
    let (status, _) = shell.get_text(&manager, "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff = shell.signed_in(STAFF).await;
    let (status, _) = shell.get_text(&staff, "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = shell.signed_in(ADMIN).await;
    let (status, html) = shell.get_text(&admin, "/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1 class=\"page-title\">Admin</h1>"));
}

#[tokio::test]
async fn test_current_section_is_highlighted() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = shell.signed_in(STAFF).await;

    let (status, html) = shell.get_text(&client, "/sales").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches("aria-current=\"page\"").count(), 1);
    assert!(html.contains("href=\"/sales\" class=\"nav-link active\""));
    assert!(html.contains("href=\"/\" class=\"nav-link\""));
}

#[tokio::test]
async fn test_signed_out_requests_redirect_or_reject() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;
    let client = browser();

    for path in ["/", "/inventory", "/admin"] {
        let response = client.get(shell.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/auth/login"), "{path}");
    }

    let response = client.get(shell.url("/api/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let backend = FakeBackend::start(BackendScript::default()).await;
    let shell = TestShell::start(&backend).await;

    let (status, body) = shell.get_text(&browser(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
