use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::error::Result;
use super::forms::{
    ensure_csrf, CsrfForm, FormErrors, HtmlForm, LoginForm, PasswordChangeForm, SignupForm, NON_FIELD,
    REQUIRED,
};
use super::pages;
use super::AppState;
use crate::auth::{
    clear_session_cookie, generate_csrf_token, generate_session_token, get_client_ip,
    get_user_agent, hash_password, session_cookie, session_expiry, verify_password, MaybeUser,
    RequireUser, MAX_SESSIONS_PER_USER,
};
use crate::db::{self as queries, NewUser};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const OLD_PASSWORD_WRONG: &str =
    "Your old password was entered incorrectly. Please enter it again.";

/// Create the router for account management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_page).post(signup_post))
        .route("/auth/login/", get(login_page).post(login_post))
        .route("/auth/logout/", post(logout))
        .route(
            "/auth/password_change/",
            get(password_change_page).post(password_change_post),
        )
        .route("/auth/password_change/done/", get(password_change_done))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    next: Option<String>,
}

/// Only same-site paths are followed after login; anything else falls back to `/`.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

/// Open a new session for `user_id` and redirect to `location` with the cookie set.
async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    user_id: i64,
    location: &str,
) -> Result<Response> {
    let pool = state.pool();

    // Keep MAX_SESSIONS_PER_USER - 1 so the new one fits
    if queries::count_user_sessions(pool, user_id).await? >= MAX_SESSIONS_PER_USER {
        let removed =
            queries::delete_oldest_user_sessions(pool, user_id, MAX_SESSIONS_PER_USER - 1).await?;
        tracing::debug!(user_id, removed, "Dropped oldest sessions");
    }

    let token = generate_session_token();
    let csrf_token = generate_csrf_token();
    let ip = get_client_ip(headers);
    let user_agent = get_user_agent(headers);
    let expires_at = session_expiry(state.config.session_ttl_days);

    queries::create_session(
        pool,
        user_id,
        &token,
        &csrf_token,
        &ip,
        user_agent.as_deref(),
        &expires_at,
    )
    .await?;

    let cookie = session_cookie(&token, state.config.session_ttl_days, state.config.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(location)).into_response())
}

// ========== Sign up ==========

async fn signup_page(MaybeUser(viewer): MaybeUser) -> Response {
    if viewer.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(pages::render_signup_page(&SignupForm::default(), &FormErrors::default()).into_string())
        .into_response()
}

async fn signup_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    HtmlForm(form): HtmlForm<SignupForm>,
) -> Result<Response> {
    let mut errors = form.validate();
    let username = form.username.trim();

    if errors.get("username").is_empty()
        && queries::username_exists(state.pool(), username).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }

    if !errors.is_empty() {
        return Ok(Html(pages::render_signup_page(&form, &errors).into_string()).into_response());
    }

    let password_hash = hash_password(&form.password1)?;
    let email = form.email.trim();
    let new_user = NewUser {
        username: username.to_string(),
        email: (!email.is_empty()).then(|| email.to_string()),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        password_hash,
    };

    // The first account gets the admin flag
    let Some((user_id, is_admin)) = queries::register_user(state.pool(), &new_user).await? else {
        // Lost a race with another signup for the same name
        errors.add("username", USERNAME_TAKEN);
        return Ok(Html(pages::render_signup_page(&form, &errors).into_string()).into_response());
    };

    tracing::info!(user_id, username = %new_user.username, is_admin, "User signed up");

    start_session(&state, &headers, user_id, "/").await
}

// ========== Log in / log out ==========

async fn login_page(
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<NextParams>,
) -> Response {
    let next = safe_next(params.next.as_deref());
    if viewer.is_some() {
        return Redirect::to(next.unwrap_or("/")).into_response();
    }
    Html(pages::render_login_page("", next, &FormErrors::default()).into_string()).into_response()
}

async fn login_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    HtmlForm(form): HtmlForm<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref());
    let username = form.username.trim();

    let mut errors = FormErrors::default();
    if username.is_empty() {
        errors.add("username", REQUIRED);
    }
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }

    if errors.is_empty() {
        let user = queries::get_user_by_username(state.pool(), username).await?;
        match user {
            Some(user) if user.is_active && verify_password(&form.password, &user.password_hash)? => {
                tracing::info!(user_id = user.id, "User logged in");
                return start_session(&state, &headers, user.id, next.unwrap_or("/")).await;
            }
            _ => {
                tracing::debug!(username = %username, ip = %get_client_ip(&headers), "Failed login");
                errors.add(NON_FIELD, INVALID_LOGIN);
            }
        }
    }

    Ok(Html(pages::render_login_page(username, next, &errors).into_string()).into_response())
}

async fn logout(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    if let Some(viewer) = viewer {
        ensure_csrf(&viewer, form.csrf_token.as_deref())?;
        queries::delete_session(state.pool(), &viewer.session_token).await?;
        tracing::info!(user_id = viewer.id(), "User logged out");
    }

    let cookie = clear_session_cookie(state.config.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Html(pages::render_logged_out_page().into_string()),
    )
        .into_response())
}

// ========== Password change ==========

async fn password_change_page(RequireUser(viewer): RequireUser) -> Response {
    Html(pages::render_password_change_page(&FormErrors::default(), &viewer).into_string())
        .into_response()
}

async fn password_change_post(
    State(state): State<AppState>,
    RequireUser(viewer): RequireUser,
    HtmlForm(form): HtmlForm<PasswordChangeForm>,
) -> Result<Response> {
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;

    let mut errors = form.validate(&viewer.user.username);
    if !form.old_password.is_empty()
        && !verify_password(&form.old_password, &viewer.user.password_hash)?
    {
        errors.add("old_password", OLD_PASSWORD_WRONG);
    }

    if !errors.is_empty() {
        return Ok(
            Html(pages::render_password_change_page(&errors, &viewer).into_string())
                .into_response(),
        );
    }

    let password_hash = hash_password(&form.new_password1)?;
    queries::update_user_password(state.pool(), viewer.id(), &password_hash).await?;
    let revoked =
        queries::delete_other_user_sessions(state.pool(), viewer.id(), &viewer.session_token)
            .await?;

    tracing::info!(user_id = viewer.id(), revoked, "Password changed");

    Ok(Redirect::to("/auth/password_change/done/").into_response())
}

async fn password_change_done(RequireUser(viewer): RequireUser) -> Response {
    Html(pages::render_password_change_done_page(&viewer).into_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/create/")), Some("/create/"));
        assert_eq!(safe_next(Some("/follow/?page=2")), Some("/follow/?page=2"));
        assert_eq!(safe_next(Some("//evil.example/")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
