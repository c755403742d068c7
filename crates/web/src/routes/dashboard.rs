//! Dashboard route handlers.
//!
//! All three surfaces run the same four fetches through the shared query
//! cache; they differ only in how the result reaches the browser.

use std::convert::Infallible;

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    response::{
        Html, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::{Stream, StreamExt};
use tracing::instrument;

use crate::components::{DashboardView, NavFrame};
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub frame: NavFrame,
    pub view: DashboardView,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/dashboard", get(dashboard_json))
        .route("/api/dashboard/stream", get(dashboard_stream))
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip_all, fields(email = %auth.user.email))]
async fn dashboard(State(state): State<AppState>, auth: Authenticated) -> Html<String> {
    let Authenticated { user, token } = auth;
    let snapshot = state.dashboard(&user.cache_scope(), token).snapshot().await;

    let template = DashboardTemplate {
        frame: NavFrame::build(Some(&user), "/"),
        view: DashboardView::from_snapshot(&snapshot, state.config().dashboard.locale),
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Derived dashboard view as JSON.
///
/// GET /api/dashboard
#[instrument(skip_all, fields(email = %auth.user.email))]
async fn dashboard_json(State(state): State<AppState>, auth: Authenticated) -> Json<DashboardView> {
    let Authenticated { user, token } = auth;
    let snapshot = state.dashboard(&user.cache_scope(), token).snapshot().await;

    Json(DashboardView::from_snapshot(
        &snapshot,
        state.config().dashboard.locale,
    ))
}

/// Stream the dashboard view as each source settles.
///
/// GET /api/dashboard/stream
///
/// Emits one `snapshot` event per state change, starting from the
/// all-pending view. The last event has `complete: true`. Closing the
/// connection drops the fetches still in flight.
async fn dashboard_stream(
    State(state): State<AppState>,
    Authenticated { user, token }: Authenticated,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let locale = state.config().dashboard.locale;
    let updates = state.dashboard(&user.cache_scope(), token).updates();

    let events = updates.map(move |snapshot| {
        let view = DashboardView::from_snapshot(&snapshot, locale);
        let json = serde_json::to_string(&view).unwrap_or_else(|_| {
            r#"{"error":"Failed to serialize dashboard"}"#.to_string()
        });
        Ok(Event::default().event("snapshot").data(json))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
