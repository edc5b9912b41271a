use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Oldest sessions beyond this count are dropped on login.
pub const MAX_SESSIONS_PER_USER: i64 = 10;

/// Generate a cryptographically secure random session token.
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Expiry timestamp in SQLite's `datetime('now')` format so the two compare as strings.
#[must_use]
pub fn session_expiry(ttl_days: i64) -> String {
    let ttl = Duration::try_days(ttl_days).unwrap_or(Duration::MAX);
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// `Set-Cookie` value for a fresh session.
#[must_use]
pub fn session_cookie(token: &str, ttl_days: i64, secure: bool) -> String {
    let max_age = ttl_days.saturating_mul(86_400);
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; HttpOnly{secure}; SameSite=Lax; Path=/; Max-Age={max_age}")
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}=; HttpOnly{secure}; SameSite=Lax; Path=/; Max-Age=0")
}

/// Pull the session token out of the `Cookie` header, if any.
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
        .map(String::from)
}
