//! Request bodies for every HTML form, and their validation.
//!
//! Validation that needs the database (username or slug uniqueness, old
//! password checks) happens in the handlers; everything else lives here.

use std::collections::BTreeMap;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{FromRequest, Request};
use axum::Form;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::AppError;
use crate::auth::csrf::CSRF_FIELD;
use crate::auth::{validate_password_strength, validate_slug, validate_username, verify_csrf_token, Viewer};
use crate::db::Group;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

const GROUP_TITLE_MAX_CHARS: usize = 200;
const NAME_MAX_CHARS: usize = 150;

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reject a state-changing request whose CSRF token does not match the session.
pub fn ensure_csrf(viewer: &Viewer, submitted: Option<&str>) -> Result<(), AppError> {
    if verify_csrf_token(&viewer.csrf_token, submitted) {
        Ok(())
    } else {
        tracing::warn!(user_id = viewer.id(), "CSRF token mismatch");
        Err(AppError::CsrfFailure)
    }
}

/// `application/x-www-form-urlencoded` body whose rejections render the HTML 400 page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for HtmlForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(status = %rejection.status(), "Rejected form body");
            AppError::BadRequest(rejection.body_text())
        })?;
        Ok(Self(value))
    }
}

/// A file field from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// The create/edit post form. Submitted as `multipart/form-data`.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    /// Raw group choice: empty, or a group id.
    pub group: String,
    pub image: Option<UploadedImage>,
    /// The "clear current image" checkbox on the edit form.
    pub clear_image: bool,
    pub csrf_token: Option<String>,
}

impl PostForm {
    /// Read the form from a multipart body. Unknown fields are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => form.text = field.text().await.map_err(bad_multipart)?,
                "group" => form.group = field.text().await.map_err(bad_multipart)?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    // Browsers send an empty, unnamed part when no file was picked
                    if !file_name.is_empty() || !bytes.is_empty() {
                        form.image = Some(UploadedImage { file_name, bytes });
                    }
                }
                "image-clear" => form.clear_image = true,
                CSRF_FIELD => form.csrf_token = Some(field.text().await.map_err(bad_multipart)?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check the text and group fields, resolving the group choice to an id.
    /// The image itself is validated when it is stored.
    #[must_use]
    pub fn validate(&self, groups: &[Group]) -> (FormErrors, Option<i64>) {
        let mut errors = FormErrors::default();

        if self.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        }

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        if let Some(image) = &self.image {
            if image.bytes.is_empty() {
                errors.add("image", EMPTY_FILE);
            }
        }

        (errors, group_id)
    }

    /// Post text as it will be stored.
    #[must_use]
    pub fn cleaned_text(&self) -> &str {
        self.text.trim()
    }
}

#[async_trait]
impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(status = %rejection.status(), "Rejected multipart body");
            AppError::BadRequest(rejection.body_text())
        })?;
        Self::from_multipart(multipart).await
    }
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
    pub csrf_token: Option<String>,
}

/// Body of one-click POST actions (follow, delete, logout).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsrfForm {
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupForm {
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if let Err(msg) = validate_username(username) {
            errors.add("username", msg);
        }

        if self.first_name.trim().chars().count() > NAME_MAX_CHARS {
            errors.add("first_name", too_long(NAME_MAX_CHARS));
        }
        if self.last_name.trim().chars().count() > NAME_MAX_CHARS {
            errors.add("last_name", too_long(NAME_MAX_CHARS));
        }

        let email = self.email.trim();
        if !email.is_empty() && !looks_like_email(email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        } else {
            for msg in validate_password_strength(&self.password2, username) {
                errors.add("password2", msg);
            }
        }

        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
    pub csrf_token: Option<String>,
}

impl PasswordChangeForm {
    /// Checks everything except the old password.
    #[must_use]
    pub fn validate(&self, username: &str) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.old_password.is_empty() {
            errors.add("old_password", REQUIRED);
        }
        if self.new_password1.is_empty() {
            errors.add("new_password1", REQUIRED);
        }
        if self.new_password2.is_empty() {
            errors.add("new_password2", REQUIRED);
        } else if self.new_password1 != self.new_password2 {
            errors.add("new_password2", PASSWORD_MISMATCH);
        } else {
            for msg in validate_password_strength(&self.new_password2, username) {
                errors.add("new_password2", msg);
            }
        }

        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub csrf_token: Option<String>,
}

impl GroupForm {
    /// Checks everything except slug uniqueness.
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > GROUP_TITLE_MAX_CHARS {
            errors.add("title", too_long(GROUP_TITLE_MAX_CHARS));
        }

        let slug = self.slug.trim();
        if slug.is_empty() {
            errors.add("slug", REQUIRED);
        } else if let Err(msg) = validate_slug(slug) {
            errors.add("slug", msg);
        }

        errors
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this value has at most {max} characters.")
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
