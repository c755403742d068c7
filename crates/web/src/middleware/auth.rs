//! Authentication extractors and session helpers.
//!
//! The signed-in identity and the backend bearer token live in the session.
//! [`sign_in`] establishes both; [`sign_out`] removes them unconditionally.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::backend::AccessToken;
use crate::models::{CurrentUser, session_keys};

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, returns a redirect to the login page for HTML
/// requests, or 401 Unauthorized for API requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor for handlers that call the backend on the user's behalf.
///
/// Rejects like [`RequireUser`] when either the identity or the bearer
/// token is missing.
pub struct Authenticated {
    pub user: CurrentUser,
    pub token: AccessToken,
}

/// Error returned when authentication is required but the user is not signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn signed_in_user(parts: &Parts) -> Result<(&Session, CurrentUser), AuthRejection> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let user = current_user(session)
        .await
        .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))?;

    Ok((session, user))
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, user) = signed_in_user(parts).await?;
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (session, user) = signed_in_user(parts).await?;
        let token = access_token(session)
            .await
            .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))?;

        Ok(Self { user, token })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject the request if nobody is signed in.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// The signed-in user, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// The signed-in user's backend bearer token, if any.
pub async fn access_token(session: &Session) -> Option<AccessToken> {
    session
        .get::<String>(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
        .map(AccessToken::new)
}

/// Store a freshly authenticated user and their bearer token.
///
/// Rotates the session ID first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    user: &CurrentUser,
    token: &AccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session
        .insert(session_keys::ACCESS_TOKEN, token.expose())
        .await
}

/// Remove the signed-in user and token from the session.
///
/// Always clears the session data, even when the store cannot be reached.
/// Returns the user that was signed in, if any.
pub async fn sign_out(session: &Session) -> Option<CurrentUser> {
    let user = current_user(session).await;

    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to delete session from store; clearing locally");
        session.clear().await;
    }

    user
}
