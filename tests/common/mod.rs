//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::auth::{generate_csrf_token, generate_session_token, hash_password, session_expiry};
use yatube::config::Config;
use yatube::db::{self, Database, NewPost, NewUser};
use yatube::web::{create_app, AppState};

pub const PASSWORD: &str = "Tr0ub4dor-horse";

/// 1x2 GIF used for upload tests.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

const BOUNDARY: &str = "----yatube-test-boundary";

/// Argon2 is slow in debug builds, so every test user shares one hash of [`PASSWORD`].
fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("Failed to hash password"))
        .clone()
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// A logged-in client: cookie header value plus the session's CSRF token.
pub struct Client {
    pub user_id: i64,
    pub cookie: String,
    pub csrf: String,
}

pub fn test_config(dir: &Path, cache_ttl: Duration) -> Config {
    Config {
        database_path: dir.join("test.db"),
        media_root: dir.join("media"),
        max_upload_bytes: 1024 * 1024,
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        posts_per_page: 10,
        index_cache_ttl: cache_ttl,
        session_ttl_days: 1,
        cookie_secure: false,
        cleanup_interval: Duration::from_secs(3600),
    }
}

pub async fn setup() -> TestApp {
    setup_with_cache(Duration::ZERO).await
}

pub async fn setup_with_cache(cache_ttl: Duration) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(dir.path(), cache_ttl);
    std::fs::create_dir_all(&config.media_root).expect("Failed to create media dir");
    let db = Database::new(&config.database_path)
        .await
        .expect("Failed to create database");
    let state = AppState::new(config, db);
    let app = create_app(state.clone());
    TestApp { app, state, dir }
}

impl TestApp {
    pub async fn create_user(&self, username: &str) -> i64 {
        let user = NewUser {
            username: username.to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash: password_hash(),
        };
        db::create_user(self.state.pool(), &user, false)
            .await
            .expect("Failed to create user")
    }

    pub async fn make_admin(&self, username: &str) -> i64 {
        let user = NewUser {
            username: username.to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash: password_hash(),
        };
        db::create_user(self.state.pool(), &user, true)
            .await
            .expect("Failed to create admin")
    }

    /// Open a session directly in the database.
    pub async fn login(&self, user_id: i64) -> Client {
        let token = generate_session_token();
        let csrf = generate_csrf_token();
        db::create_session(
            self.state.pool(),
            user_id,
            &token,
            &csrf,
            "127.0.0.1",
            None,
            &session_expiry(1),
        )
        .await
        .expect("Failed to create session");
        Client {
            user_id,
            cookie: format!("session={token}"),
            csrf,
        }
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> i64 {
        let group = db::NewGroup {
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("About {title}"),
        };
        db::insert_group(self.state.pool(), &group)
            .await
            .expect("Failed to create group")
    }

    pub async fn create_post(&self, author_id: i64, text: &str, group_id: Option<i64>) -> i64 {
        let post = NewPost {
            text: text.to_string(),
            author_id,
            group_id,
            image: None,
        };
        db::insert_post(self.state.pool(), &post)
            .await
            .expect("Failed to create post")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }
}

pub fn get(uri: &str, client: Option<&Client>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(client) = client {
        builder = builder.header(header::COOKIE, &client.cookie);
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub fn post_form(uri: &str, client: Option<&Client>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(client) = client {
        builder = builder.header(header::COOKIE, &client.cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Build a `multipart/form-data` post request with text fields and an optional file.
pub fn post_multipart(
    uri: &str,
    client: &Client,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, &client.cookie)
        .body(Body::from(body))
        .expect("Failed to build request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
