use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::error::Result;
use super::forms::{ensure_csrf, CommentForm, CsrfForm, FormErrors, HtmlForm, PostForm};
use super::pages;
use super::{AppError, AppState, PageCache};
use crate::auth::{MaybeUser, RequireUser, Viewer};
use crate::db;
use crate::media::{self, MediaError};
use crate::pagination::{Page, PageRequest};

/// Create the router for posts, groups, profiles and follows.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/:slug/", get(group_list))
        .route("/profile/:username/", get(profile))
        .route(
            "/profile/:username/follow/",
            get(profile_follow_link).post(profile_follow),
        )
        .route(
            "/profile/:username/unfollow/",
            get(profile_unfollow_link).post(profile_unfollow),
        )
        .route("/posts/:id/", get(post_detail))
        .route("/posts/:id/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/:id/delete/", post(post_delete))
        .route("/posts/:id/comment/", post(add_comment))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/follow/", get(follow_index))
        .route("/about/author/", get(about_author))
        .route("/about/tech/", get(about_tech))
        .route("/healthz", get(health))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
}

fn page_request(state: &AppState, params: &PageParams, total: i64) -> PageRequest {
    PageRequest::resolve(
        params.page.as_deref(),
        state.config.posts_per_page,
        usize::try_from(total).unwrap_or(0),
    )
}

fn html_response(markup: maud::Markup) -> Response {
    Html(markup.into_string()).into_response()
}

// ========== Listings ==========

async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let key = PageCache::key(&uri.to_string(), viewer.as_ref().map(Viewer::id));
    if let Some(body) = state.page_cache.get(&key) {
        return Ok(Html(body).into_response());
    }

    let total = db::count_posts(state.pool()).await?;
    let request = page_request(&state, &params, total);
    let posts = db::get_posts_page(state.pool(), request.limit(), request.offset()).await?;
    let page = Page::new(posts, request);

    let body = pages::render_index_page(&page, viewer.as_ref()).into_string();
    state.page_cache.insert(key, body.clone());
    Ok(Html(body).into_response())
}

async fn group_list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let group = db::get_group_by_slug(state.pool(), &slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let total = db::count_group_posts(state.pool(), group.id).await?;
    let request = page_request(&state, &params, total);
    let posts =
        db::get_group_posts(state.pool(), group.id, request.limit(), request.offset()).await?;
    let page = Page::new(posts, request);

    Ok(html_response(pages::render_group_page(
        &group,
        &page,
        viewer.as_ref(),
    )))
}

async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    MaybeUser(viewer): MaybeUser,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let author = db::get_user_by_username(state.pool(), &username)
        .await?
        .ok_or(AppError::NotFound)?;

    let total = db::count_author_posts(state.pool(), author.id).await?;
    let request = page_request(&state, &params, total);
    let posts =
        db::get_author_posts(state.pool(), author.id, request.limit(), request.offset()).await?;
    let page = Page::new(posts, request);
    let follower_count = db::count_followers(state.pool(), author.id).await?;

    let following = match &viewer {
        Some(v) if v.id() != author.id => {
            Some(db::is_following(state.pool(), v.id(), author.id).await?)
        }
        _ => None,
    };

    Ok(html_response(pages::render_profile_page(
        &pages::ProfilePageParams {
            author: &author,
            post_count: total,
            follower_count,
            page: &page,
            following,
            viewer: viewer.as_ref(),
        },
    )))
}

async fn follow_index(
    State(state): State<AppState>,
    RequireUser(viewer): RequireUser,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let total = db::count_feed_posts(state.pool(), viewer.id()).await?;
    let request = page_request(&state, &params, total);
    let posts =
        db::get_feed_posts(state.pool(), viewer.id(), request.limit(), request.offset()).await?;
    let page = Page::new(posts, request);

    Ok(html_response(pages::render_follow_page(&page, &viewer)))
}

// ========== Post detail and comments ==========

async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Response> {
    let post = db::get_post_display(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    let author_post_count = db::count_author_posts(state.pool(), post.author_id).await?;
    let comments = db::get_comments_for_post(state.pool(), id).await?;

    Ok(html_response(pages::render_post_detail_page(
        &post,
        author_post_count,
        &comments,
        viewer.as_ref(),
    )))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RequireUser(viewer): RequireUser,
    HtmlForm(form): HtmlForm<CommentForm>,
) -> Result<Response> {
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;

    let post = db::get_post(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let text = form.text.trim();
    if text.is_empty() {
        tracing::debug!(post_id = post.id, "Ignoring blank comment");
    } else {
        let comment_id = db::insert_comment(state.pool(), post.id, viewer.id(), text).await?;
        tracing::info!(post_id = post.id, comment_id, user_id = viewer.id(), "Comment added");
    }

    Ok(Redirect::to(&format!("/posts/{}/", post.id)).into_response())
}

// ========== Create / edit / delete ==========

async fn post_create_form(
    State(state): State<AppState>,
    RequireUser(viewer): RequireUser,
) -> Result<Response> {
    let groups = db::get_all_groups(state.pool()).await?;
    let errors = FormErrors::default();

    Ok(html_response(pages::render_post_form_page(
        &pages::PostFormParams {
            post_id: None,
            text: "",
            group: "",
            current_image: None,
            groups: &groups,
            errors: &errors,
        },
        &viewer,
    )))
}

async fn post_create(
    State(state): State<AppState>,
    RequireUser(viewer): RequireUser,
    form: PostForm,
) -> Result<Response> {
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;

    let groups = db::get_all_groups(state.pool()).await?;
    let (mut errors, group_id) = form.validate(&groups);

    let image = if errors.is_empty() {
        store_upload(&state, &form, &mut errors).await?
    } else {
        None
    };

    if !errors.is_empty() {
        return Ok(render_post_form_with_errors(&form, None, None, &groups, &errors, &viewer));
    }

    let new_post = db::NewPost {
        text: form.cleaned_text().to_string(),
        author_id: viewer.id(),
        group_id,
        image,
    };
    let post_id = match db::insert_post(state.pool(), &new_post).await {
        Ok(id) => id,
        Err(e) => {
            discard_upload(&state, new_post.image.as_deref()).await;
            return Err(e.into());
        }
    };
    state.page_cache.clear();

    tracing::info!(post_id, user_id = viewer.id(), "Post created");

    Ok(Redirect::to(&format!("/profile/{}/", viewer.user.username)).into_response())
}

async fn post_edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RequireUser(viewer): RequireUser,
) -> Result<Response> {
    let post = db::get_post(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    if post.author_id != viewer.id() {
        return Ok(Redirect::to(&format!("/posts/{id}/")).into_response());
    }

    let groups = db::get_all_groups(state.pool()).await?;
    let group = post.group_id.map(|g| g.to_string()).unwrap_or_default();
    let errors = FormErrors::default();

    Ok(html_response(pages::render_post_form_page(
        &pages::PostFormParams {
            post_id: Some(post.id),
            text: &post.text,
            group: &group,
            current_image: post.image.as_deref(),
            groups: &groups,
            errors: &errors,
        },
        &viewer,
    )))
}

async fn post_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RequireUser(viewer): RequireUser,
    form: PostForm,
) -> Result<Response> {
    let post = db::get_post(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    if post.author_id != viewer.id() {
        return Ok(Redirect::to(&format!("/posts/{id}/")).into_response());
    }

    ensure_csrf(&viewer, form.csrf_token.as_deref())?;

    let groups = db::get_all_groups(state.pool()).await?;
    let (mut errors, group_id) = form.validate(&groups);

    let uploaded = if errors.is_empty() {
        store_upload(&state, &form, &mut errors).await?
    } else {
        None
    };

    if !errors.is_empty() {
        return Ok(render_post_form_with_errors(
            &form,
            Some(post.id),
            post.image.as_deref(),
            &groups,
            &errors,
            &viewer,
        ));
    }

    // A new upload wins over the clear checkbox; otherwise keep what was there.
    let image = match &uploaded {
        Some(path) => Some(path.clone()),
        None if form.clear_image => None,
        None => post.image.clone(),
    };

    if let Err(e) = db::update_post(
        state.pool(),
        post.id,
        form.cleaned_text(),
        group_id,
        image.as_deref(),
    )
    .await
    {
        discard_upload(&state, uploaded.as_deref()).await;
        return Err(e.into());
    }
    state.page_cache.clear();

    tracing::info!(post_id = post.id, user_id = viewer.id(), "Post edited");

    Ok(Redirect::to(&format!("/posts/{}/", post.id)).into_response())
}

async fn post_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RequireUser(viewer): RequireUser,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    let post = db::get_post(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    if post.author_id != viewer.id() {
        return Ok(Redirect::to(&format!("/posts/{id}/")).into_response());
    }
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;

    db::delete_post(state.pool(), post.id).await?;
    state.page_cache.clear();

    tracing::info!(post_id = post.id, user_id = viewer.id(), "Post deleted");

    Ok(Redirect::to(&format!("/profile/{}/", viewer.user.username)).into_response())
}

/// Store the uploaded image, if any. Rejections become form errors on `image`.
async fn store_upload(
    state: &AppState,
    form: &PostForm,
    errors: &mut FormErrors,
) -> Result<Option<String>> {
    let Some(upload) = &form.image else {
        return Ok(None);
    };

    match media::store_post_image(
        &state.config.media_root,
        &upload.file_name,
        &upload.bytes,
        state.config.max_upload_bytes,
    )
    .await
    {
        Ok(path) => {
            tracing::debug!(path = %path, "Stored upload");
            Ok(Some(path))
        }
        Err(MediaError::Io(e)) => Err(AppError::Internal(
            anyhow::Error::new(e).context("Failed to store uploaded image"),
        )),
        Err(e) => {
            errors.add("image", e.to_string());
            Ok(None)
        }
    }
}

/// Remove a freshly stored upload whose post was not saved.
async fn discard_upload(state: &AppState, image: Option<&str>) {
    if let Some(path) = image {
        media::remove_post_image(&state.config.media_root, path).await;
    }
}

fn render_post_form_with_errors(
    form: &PostForm,
    post_id: Option<i64>,
    current_image: Option<&str>,
    groups: &[db::Group],
    errors: &FormErrors,
    viewer: &Viewer,
) -> Response {
    html_response(pages::render_post_form_page(
        &pages::PostFormParams {
            post_id,
            text: &form.text,
            group: &form.group,
            current_image,
            groups,
            errors,
        },
        viewer,
    ))
}

// ========== Follows ==========

/// Subscribe or unsubscribe `viewer` to `username`, then go back to the profile.
async fn set_following(
    state: &AppState,
    viewer: &Viewer,
    username: &str,
    follow: bool,
) -> Result<Response> {
    let author = db::get_user_by_username(state.pool(), username)
        .await?
        .ok_or(AppError::NotFound)?;

    if follow {
        if db::follow_author(state.pool(), viewer.id(), author.id).await? {
            tracing::info!(user_id = viewer.id(), author_id = author.id, "Followed author");
        }
    } else if db::unfollow_author(state.pool(), viewer.id(), author.id).await? {
        tracing::info!(user_id = viewer.id(), author_id = author.id, "Unfollowed author");
    }

    Ok(Redirect::to(&format!("/profile/{}/", author.username)).into_response())
}

async fn profile_follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    RequireUser(viewer): RequireUser,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;
    set_following(&state, &viewer, &username, true).await
}

async fn profile_unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    RequireUser(viewer): RequireUser,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    ensure_csrf(&viewer, form.csrf_token.as_deref())?;
    set_following(&state, &viewer, &username, false).await
}

/// Plain links to the follow URLs. Both actions are idempotent, so no token is needed.
async fn profile_follow_link(
    State(state): State<AppState>,
    Path(username): Path<String>,
    RequireUser(viewer): RequireUser,
) -> Result<Response> {
    set_following(&state, &viewer, &username, true).await
}

async fn profile_unfollow_link(
    State(state): State<AppState>,
    Path(username): Path<String>,
    RequireUser(viewer): RequireUser,
) -> Result<Response> {
    set_following(&state, &viewer, &username, false).await
}

// ========== Static pages ==========

async fn about_author(MaybeUser(viewer): MaybeUser) -> Response {
    html_response(pages::render_about_author_page(viewer.as_ref()))
}

async fn about_tech(MaybeUser(viewer): MaybeUser) -> Response {
    html_response(pages::render_about_tech_page(viewer.as_ref()))
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
