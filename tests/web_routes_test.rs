//! Integration tests for the post, group, profile and follow routes.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{
    body_string, get, location, post_form, post_multipart, setup, setup_with_cache, SMALL_GIF,
};
use yatube::db;

fn content_type(response: &axum::http::Response<Body>) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_endpoint() {
    let t = setup().await;
    let response = t.send(get("/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn test_public_pages_are_reachable() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let group = t.create_group("Cats", "cats").await;
    let post = t.create_post(author, "A post about cats", Some(group)).await;

    for uri in [
        "/".to_string(),
        "/group/cats/".to_string(),
        "/profile/leo/".to_string(),
        format!("/posts/{post}/"),
        "/about/author/".to_string(),
        "/about/tech/".to_string(),
    ] {
        let response = t.send(get(&uri, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn test_unknown_pages_return_404() {
    let t = setup().await;
    for uri in [
        "/unexisting_page/",
        "/about/x/",
        "/group/nope/",
        "/profile/nobody/",
        "/posts/999/",
    ] {
        let response = t.send(get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        assert!(body_string(response).await.contains("Page not found"));
    }
}

#[tokio::test]
async fn test_login_required_pages_redirect_anonymous() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let post = t.create_post(author, "text", None).await;

    let response = t.send(get("/create/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/create/");

    let response = t.send(get(&format!("/posts/{post}/edit/"), None)).await;
    assert_eq!(
        location(&response),
        format!("/auth/login/?next=/posts/{post}/edit/")
    );

    let response = t.send(get("/follow/", None)).await;
    assert_eq!(location(&response), "/auth/login/?next=/follow/");
}

#[tokio::test]
async fn test_paginator_splits_posts() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let group = t.create_group("Cats", "cats").await;
    for i in 0..13 {
        t.create_post(author, &format!("Post {i}"), Some(group)).await;
    }

    for base in ["/", "/group/cats/", "/profile/leo/"] {
        let first = body_string(t.send(get(base, None)).await).await;
        assert_eq!(first.matches(r#"class="post-card""#).count(), 10, "{base}");

        let second = body_string(t.send(get(&format!("{base}?page=2"), None)).await).await;
        assert_eq!(second.matches(r#"class="post-card""#).count(), 3, "{base}?page=2");
    }

    // Out-of-range and garbage page numbers fall back to a real page
    let last = body_string(t.send(get("/?page=99", None)).await).await;
    assert_eq!(last.matches(r#"class="post-card""#).count(), 3);
    let first = body_string(t.send(get("/?page=abc", None)).await).await;
    assert_eq!(first.matches(r#"class="post-card""#).count(), 10);
}

#[tokio::test]
async fn test_group_page_only_shows_its_posts() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let cats = t.create_group("Cats", "cats").await;
    t.create_group("Dogs", "dogs").await;
    t.create_post(author, "Meow meow", Some(cats)).await;

    let body = body_string(t.send(get("/group/dogs/", None)).await).await;
    assert!(!body.contains("Meow meow"));
    let body = body_string(t.send(get("/group/cats/", None)).await).await;
    assert!(body.contains("Meow meow"));
}

#[tokio::test]
async fn test_create_post_with_image() {
    let t = setup().await;
    let group = t.create_group("Cats", "cats").await;
    let author = t.create_user("leo").await;
    let client = t.login(author).await;

    let group_field = group.to_string();
    let response = t
        .send(post_multipart(
            "/create/",
            &client,
            &[
                ("csrf_token", client.csrf.as_str()),
                ("text", "A brand new post"),
                ("group", group_field.as_str()),
            ],
            Some(("image", "small.gif", SMALL_GIF)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/leo/");

    let post = db::get_latest_post(t.state.pool())
        .await
        .unwrap()
        .expect("post was not created");
    assert_eq!(post.text, "A brand new post");
    assert_eq!(post.group_id, Some(group));
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
    assert!(t.dir.path().join("media/posts/small.gif").is_file());

    // The image is shown on every listing
    let detail = format!("/posts/{}/", post.id);
    for uri in ["/", "/group/cats/", "/profile/leo/", detail.as_str()] {
        let body = body_string(t.send(get(uri, None)).await).await;
        assert!(body.contains(r#"src="/media/posts/small.gif""#), "{uri}");
    }
}

#[tokio::test]
async fn test_create_post_rejects_invalid_input() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let client = t.login(author).await;

    let response = t
        .send(post_multipart(
            "/create/",
            &client,
            &[("csrf_token", client.csrf.as_str()), ("text", "   "), ("group", "42")],
            Some(("image", "notes.txt", &b"plain text, not an image"[..])),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Select a valid choice."));
    assert_eq!(db::count_posts(t.state.pool()).await.unwrap(), 0);

    let response = t
        .send(post_multipart(
            "/create/",
            &client,
            &[("csrf_token", client.csrf.as_str()), ("text", "Valid text")],
            Some(("image", "notes.txt", &b"plain text, not an image"[..])),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Upload a valid image."));
    assert_eq!(db::count_posts(t.state.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_post_requires_csrf() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let client = t.login(author).await;

    let response = t
        .send(post_multipart(
            "/create/",
            &client,
            &[("csrf_token", "forged"), ("text", "Sneaky")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(db::count_posts(t.state.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_edit_post() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let group = t.create_group("Cats", "cats").await;
    let post = t.create_post(author, "Original", Some(group)).await;
    let client = t.login(author).await;

    let response = t.send(get(&format!("/posts/{post}/edit/"), Some(&client))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Original</textarea>"));

    let response = t
        .send(post_multipart(
            &format!("/posts/{post}/edit/"),
            &client,
            &[("csrf_token", client.csrf.as_str()), ("text", "Edited"), ("group", "")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post}/"));

    let updated = db::get_post(t.state.pool(), post).await.unwrap().unwrap();
    assert_eq!(updated.text, "Edited");
    assert_eq!(updated.group_id, None);

    // The group no longer lists it
    let body = body_string(t.send(get("/group/cats/", None)).await).await;
    assert!(!body.contains("Edited"));
}

#[tokio::test]
async fn test_edit_keeps_or_clears_image() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let client = t.login(author).await;

    t.send(post_multipart(
        "/create/",
        &client,
        &[("csrf_token", client.csrf.as_str()), ("text", "With image")],
        Some(("image", "small.gif", SMALL_GIF)),
    ))
    .await;
    let post = db::get_latest_post(t.state.pool()).await.unwrap().unwrap();
    let uri = format!("/posts/{}/edit/", post.id);

    t.send(post_multipart(
        &uri,
        &client,
        &[("csrf_token", client.csrf.as_str()), ("text", "Still with image")],
        None,
    ))
    .await;
    let kept = db::get_post(t.state.pool(), post.id).await.unwrap().unwrap();
    assert_eq!(kept.image.as_deref(), Some("posts/small.gif"));

    t.send(post_multipart(
        &uri,
        &client,
        &[
            ("csrf_token", client.csrf.as_str()),
            ("text", "No image"),
            ("image-clear", "on"),
        ],
        None,
    ))
    .await;
    let cleared = db::get_post(t.state.pool(), post.id).await.unwrap().unwrap();
    assert_eq!(cleared.image, None);
}

#[tokio::test]
async fn test_non_author_cannot_edit_or_delete() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let other = t.create_user("max").await;
    let post = t.create_post(author, "Mine", None).await;
    let client = t.login(other).await;

    let response = t.send(get(&format!("/posts/{post}/edit/"), Some(&client))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{post}/"));

    let response = t
        .send(post_multipart(
            &format!("/posts/{post}/edit/"),
            &client,
            &[("csrf_token", client.csrf.as_str()), ("text", "Hijacked")],
            None,
        ))
        .await;
    assert_eq!(location(&response), format!("/posts/{post}/"));

    let response = t
        .send(post_form(
            &format!("/posts/{post}/delete/"),
            Some(&client),
            &format!("csrf_token={}", client.csrf),
        ))
        .await;
    assert_eq!(location(&response), format!("/posts/{post}/"));

    let unchanged = db::get_post(t.state.pool(), post).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Mine");
}

#[tokio::test]
async fn test_author_deletes_post() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let post = t.create_post(author, "Short-lived", None).await;
    let client = t.login(author).await;

    let response = t
        .send(post_form(
            &format!("/posts/{post}/delete/"),
            Some(&client),
            &format!("csrf_token={}", client.csrf),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/leo/");
    assert!(db::get_post(t.state.pool(), post).await.unwrap().is_none());

    let response = t.send(get(&format!("/posts/{post}/"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let reader = t.create_user("max").await;
    let post = t.create_post(author, "Discuss", None).await;
    let uri = format!("/posts/{post}/comment/");

    // Anonymous comments are bounced to the login page
    let response = t.send(post_form(&uri, None, "text=hello")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/auth/login/?next="));

    let client = t.login(reader).await;
    for text in ["First comment", "Second comment"] {
        let response = t
            .send(post_form(
                &uri,
                Some(&client),
                &format!("csrf_token={}&text={}", client.csrf, urlencoding::encode(text)),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/posts/{post}/"));
    }

    let body = body_string(t.send(get(&format!("/posts/{post}/"), None)).await).await;
    let first = body.find("First comment").expect("first comment shown");
    let second = body.find("Second comment").expect("second comment shown");
    assert!(second < first, "newest comment comes first");

    // Comments on a missing post
    let response = t
        .send(post_form(
            "/posts/999/comment/",
            Some(&client),
            &format!("csrf_token={}&text=hi", client.csrf),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let reader = t.create_user("max").await;
    let stranger = t.create_user("ann").await;
    t.create_post(author, "For my followers", None).await;

    let client = t.login(reader).await;
    let csrf = format!("csrf_token={}", client.csrf);

    for _ in 0..2 {
        let response = t
            .send(post_form("/profile/leo/follow/", Some(&client), &csrf))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/profile/leo/");
    }
    assert_eq!(db::count_followers(t.state.pool(), author).await.unwrap(), 1);

    // Following yourself is ignored
    t.send(post_form("/profile/max/follow/", Some(&client), &csrf))
        .await;
    assert!(!db::is_following(t.state.pool(), reader, reader).await.unwrap());

    let feed = body_string(t.send(get("/follow/", Some(&client))).await).await;
    assert!(feed.contains("For my followers"));

    let other = t.login(stranger).await;
    let feed = body_string(t.send(get("/follow/", Some(&other))).await).await;
    assert!(!feed.contains("For my followers"));

    t.send(post_form("/profile/leo/unfollow/", Some(&client), &csrf))
        .await;
    assert!(!db::is_following(t.state.pool(), reader, author).await.unwrap());
    let feed = body_string(t.send(get("/follow/", Some(&client))).await).await;
    assert!(!feed.contains("For my followers"));
}

#[tokio::test]
async fn test_follow_requires_csrf() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let reader = t.create_user("max").await;
    let client = t.login(reader).await;

    let response = t
        .send(post_form("/profile/leo/follow/", Some(&client), "csrf_token=wrong"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!db::is_following(t.state.pool(), reader, author).await.unwrap());
}

#[tokio::test]
async fn test_follow_by_link() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let reader = t.create_user("max").await;
    let client = t.login(reader).await;

    for _ in 0..2 {
        let response = t.send(get("/profile/leo/follow/", Some(&client))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/profile/leo/");
    }
    assert!(db::is_following(t.state.pool(), reader, author).await.unwrap());
    assert_eq!(db::count_followers(t.state.pool(), author).await.unwrap(), 1);

    let response = t.send(get("/profile/leo/unfollow/", Some(&client))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!db::is_following(t.state.pool(), reader, author).await.unwrap());

    let response = t.send(get("/profile/nobody/follow/", Some(&client))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Anonymous visitors are sent to log in first
    let response = t.send(get("/profile/leo/follow/", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/profile/leo/follow/");
}

#[tokio::test]
async fn test_unreadable_bodies_render_bad_request_page() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let post = t.create_post(author, "Target", None).await;
    let client = t.login(author).await;

    // The post form must be multipart
    let response = t
        .send(post_form(
            "/create/",
            Some(&client),
            &format!("csrf_token={}&text=plain", client.csrf),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(content_type(&response).starts_with("text/html"));
    assert!(body_string(response).await.contains("400: Bad request"));
    assert_eq!(db::count_posts(t.state.pool()).await.unwrap(), 1);

    // Form handlers refuse other content types with the same page
    let request = Request::builder()
        .method("POST")
        .uri(format!("/posts/{post}/comment/"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &client.cookie)
        .body(Body::from(r#"{"text":"hi"}"#))
        .unwrap();
    let response = t.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(content_type(&response).starts_with("text/html"));
    assert!(body_string(response).await.contains("400: Bad request"));
    assert_eq!(db::count_comments(t.state.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let t = setup().await;
    let user = t.create_user("leo").await;
    let client = t.login(user).await;

    db::create_session(
        t.state.pool(),
        user,
        "expired-token",
        "csrf",
        "127.0.0.1",
        None,
        "2000-01-01 00:00:00",
    )
    .await
    .unwrap();
    let request = Request::builder()
        .uri("/create/")
        .header(header::COOKIE, "session=expired-token")
        .body(Body::empty())
        .unwrap();
    let response = t.send(request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/create/");

    // A live session of the same user still works
    let response = t.send(get("/create/", Some(&client))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_index_is_cached() {
    let t = setup_with_cache(Duration::from_secs(60)).await;
    let author = t.create_user("leo").await;
    let post = t.create_post(author, "Cached text", None).await;

    let before = body_string(t.send(get("/", None)).await).await;
    assert!(before.contains("Cached text"));

    // A write that bypasses the handlers does not invalidate the cache
    db::delete_post(t.state.pool(), post).await.unwrap();
    let cached = body_string(t.send(get("/", None)).await).await;
    assert_eq!(before, cached);

    t.state.page_cache.clear();
    let fresh = body_string(t.send(get("/", None)).await).await;
    assert!(!fresh.contains("Cached text"));
}

#[tokio::test]
async fn test_new_post_clears_cache() {
    let t = setup_with_cache(Duration::from_secs(60)).await;
    let author = t.create_user("leo").await;
    let client = t.login(author).await;

    let before = body_string(t.send(get("/", Some(&client))).await).await;
    assert!(before.contains("No posts yet."));

    t.send(post_multipart(
        "/create/",
        &client,
        &[("csrf_token", client.csrf.as_str()), ("text", "Fresh post")],
        None,
    ))
    .await;

    let after = body_string(t.send(get("/", Some(&client))).await).await;
    assert!(after.contains("Fresh post"));
}

#[tokio::test]
async fn test_post_detail_shows_author_controls() {
    let t = setup().await;
    let author = t.create_user("leo").await;
    let post = t.create_post(author, "Editable", None).await;
    let client = t.login(author).await;

    let body = body_string(t.send(get(&format!("/posts/{post}/"), Some(&client))).await).await;
    assert!(body.contains(&format!(r#"href="/posts/{post}/edit/""#)));

    let body = body_string(t.send(get(&format!("/posts/{post}/"), None)).await).await;
    assert!(!body.contains(&format!("/posts/{post}/edit/")));
}
