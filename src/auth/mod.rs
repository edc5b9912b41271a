pub mod cleanup;
pub mod csrf;
pub mod middleware;
pub mod password;
pub mod session;
pub mod validators;

pub use csrf::{generate_csrf_token, verify_csrf_token};
pub use middleware::{get_client_ip, get_user_agent, MaybeUser, RequireAdmin, RequireUser, Viewer};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use session::{
    clear_session_cookie, generate_session_token, session_cookie, session_expiry,
    session_token_from_headers, MAX_SESSIONS_PER_USER, SESSION_COOKIE,
};
pub use validators::{validate_slug, validate_username};
