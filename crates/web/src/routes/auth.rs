//! Authentication route handlers.
//!
//! Credentials are forwarded to the ERP backend; the shell never checks a
//! password itself.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use erp_shell_core::LoginRequest;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{AccessToken, BackendError};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{OptionalUser, sign_in, sign_out};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    email: String,
    error: Option<&'static str>,
}

/// Login form fields.
#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

fn render_login(status: StatusCode, email: &str, error: Option<&'static str>) -> Response {
    let template = LoginPageTemplate {
        email: email.to_string(),
        error,
    };
    let html = template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::from("Error rendering template")
    });
    (status, Html(html)).into_response()
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    render_login(StatusCode::OK, "", None)
}

/// Exchange credentials for a backend token and start a session.
///
/// POST /auth/login
#[instrument(skip_all, fields(email = %form.email.trim()))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Ok(render_login(
            StatusCode::BAD_REQUEST,
            email,
            Some("Email and password are required"),
        ));
    }

    let request = LoginRequest {
        email: email.to_string(),
        password: form.password,
    };

    let issued = match state.backend().login(&request).await {
        Ok(issued) => issued,
        Err(
            BackendError::Unauthorized
            | BackendError::Forbidden(_)
            | BackendError::Status {
                status: 400..=499, ..
            },
        ) => {
            tracing::info!("Login rejected by backend");
            return Ok(render_login(
                StatusCode::UNAUTHORIZED,
                email,
                Some("Invalid email or password"),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = AccessToken::new(issued.access_token);
    let backend_user = state.backend().current_user(&token).await?;
    let user = CurrentUser::from_backend(&backend_user, Utc::now());

    sign_in(&session, &user, &token).await?;
    set_sentry_user(&user.email);
    tracing::info!(role = %user.role, "User signed in");

    Ok(Redirect::to("/").into_response())
}

/// Sign out and clear the session.
///
/// POST /auth/logout
///
/// Takes effect immediately; dashboard fetches still running for this user
/// are not awaited, and their cached results are evicted.
async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    if let Some(user) = sign_out(&session).await {
        state.queries().invalidate_scope(&user.cache_scope());
        tracing::info!(email = %user.email, "User signed out");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH)
}
