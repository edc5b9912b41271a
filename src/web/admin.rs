use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;

use super::error::Result;
use super::forms::{ensure_csrf, CsrfForm, FormErrors, GroupForm, HtmlForm};
use super::pages;
use super::{AppError, AppState};
use crate::auth::{RequireAdmin, Viewer};
use crate::db::{self as queries, NewGroup};

const SLUG_TAKEN: &str = "Group with this Slug already exists.";

/// Create the router for the administration pages.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(admin_panel))
        .route("/admin/groups/", post(create_group))
        .route("/admin/groups/:slug/delete/", post(delete_group))
        .route("/admin/users/:id/delete/", post(delete_user))
}

async fn render_panel(
    state: &AppState,
    viewer: &Viewer,
    form: &GroupForm,
    errors: &FormErrors,
) -> Result<Response> {
    let groups = queries::get_groups_with_counts(state.pool()).await?;
    let users = queries::get_all_users(state.pool()).await?;

    let page = pages::render_admin_page(&pages::AdminPageParams {
        groups: &groups,
        users: &users,
        group_form: form,
        errors,
        viewer,
    });
    Ok(Html(page.into_string()).into_response())
}

/// GET /admin/ - Groups and users overview.
async fn admin_panel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Response> {
    render_panel(&state, &admin, &GroupForm::default(), &FormErrors::default()).await
}

/// POST /admin/groups/ - Create a group.
async fn create_group(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    HtmlForm(form): HtmlForm<GroupForm>,
) -> Result<Response> {
    ensure_csrf(&admin, form.csrf_token.as_deref())?;

    let mut errors = form.validate();
    let slug = form.slug.trim();
    if errors.get("slug").is_empty()
        && queries::get_group_by_slug(state.pool(), slug).await?.is_some()
    {
        errors.add("slug", SLUG_TAKEN);
    }

    if !errors.is_empty() {
        return render_panel(&state, &admin, &form, &errors).await;
    }

    let group = NewGroup {
        title: form.title.trim().to_string(),
        slug: slug.to_string(),
        description: form.description.trim().to_string(),
    };
    let group_id = queries::insert_group(state.pool(), &group).await?;

    tracing::info!(group_id, slug = %group.slug, admin_id = admin.id(), "Group created");

    Ok(Redirect::to("/admin/").into_response())
}

/// POST /admin/groups/:slug/delete/ - Delete a group, keeping its posts.
async fn delete_group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RequireAdmin(admin): RequireAdmin,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    ensure_csrf(&admin, form.csrf_token.as_deref())?;

    if !queries::delete_group(state.pool(), &slug).await? {
        return Err(AppError::NotFound);
    }
    // Listings show group badges
    state.page_cache.clear();

    tracing::info!(slug = %slug, admin_id = admin.id(), "Group deleted");

    Ok(Redirect::to("/admin/").into_response())
}

/// POST /admin/users/:id/delete/ - Delete a user and everything they wrote.
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    RequireAdmin(admin): RequireAdmin,
    HtmlForm(form): HtmlForm<CsrfForm>,
) -> Result<Response> {
    ensure_csrf(&admin, form.csrf_token.as_deref())?;

    if user_id == admin.id() {
        return Err(AppError::Forbidden);
    }
    if !queries::delete_user(state.pool(), user_id).await? {
        return Err(AppError::NotFound);
    }
    state.page_cache.clear();

    tracing::info!(user_id, admin_id = admin.id(), "User deleted");

    Ok(Redirect::to("/admin/").into_response())
}
