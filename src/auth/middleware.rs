use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use super::session::session_token_from_headers;
use crate::db as queries;
use crate::db::User;
use crate::web::AppError;

/// The logged-in user behind a request, with the session that authenticated them.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: User,
    pub session_token: String,
    pub csrf_token: String,
}

impl Viewer {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Current authenticated user (if any).
/// Use this extractor when authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Viewer>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);

        let Some(token) = session_token_from_headers(&parts.headers) else {
            return Ok(MaybeUser(None));
        };

        let session = match queries::get_session_by_token(&pool, &token).await {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(MaybeUser(None)),
            Err(e) => {
                tracing::error!("Failed to look up session: {e:#}");
                return Ok(MaybeUser(None));
            }
        };

        // Same format as datetime('now'), so plain string comparison works
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        if session.expires_at < now {
            let _ = queries::delete_session(&pool, &token).await;
            return Ok(MaybeUser(None));
        }

        let user = match queries::get_user_by_id(&pool, session.user_id).await {
            Ok(Some(u)) => u,
            _ => return Ok(MaybeUser(None)),
        };

        if !user.is_active {
            return Ok(MaybeUser(None));
        }

        let _ = queries::update_session_last_used(&pool, session.id).await;

        Ok(MaybeUser(Some(Viewer {
            user,
            session_token: session.token,
            csrf_token: session.csrf_token,
        })))
    }
}

/// Current authenticated user (required).
/// Anonymous requests are redirected to the login page with a `next` parameter
/// pointing back at the original path.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Viewer);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(viewer) = MaybeUser::from_request_parts(parts, state).await?;

        match viewer {
            Some(v) => Ok(RequireUser(v)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
                Err(Redirect::to(&login_url(&next)).into_response())
            }
        }
    }
}

/// Require user to be an admin.
/// Returns 403 Forbidden if user is not an admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Viewer);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(viewer) = RequireUser::from_request_parts(parts, state).await?;

        if !viewer.user.is_admin {
            return Err(AppError::Forbidden.into_response());
        }

        Ok(RequireAdmin(viewer))
    }
}

/// Login page URL that returns to `next` afterwards. Slashes stay readable.
#[must_use]
pub fn login_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("/auth/login/?next={encoded}")
}

/// Get client IP address from request headers.
pub fn get_client_ip(headers: &HeaderMap) -> String {
    // Check X-Forwarded-For header (if behind proxy)
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return first_ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    "unknown".to_string()
}

/// Get user agent from request headers.
pub fn get_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}
