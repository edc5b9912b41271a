use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::pages;

/// Errors a handler can bail out with. Each renders a full HTML error page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Page not found")]
    NotFound,

    #[error("Access denied")]
    Forbidden,

    #[error("CSRF verification failed")]
    CsrfFailure,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden | Self::CsrfFailure => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match &self {
            Self::NotFound => pages::errors::not_found_page(),
            Self::Forbidden => pages::errors::forbidden_page(),
            Self::CsrfFailure => pages::errors::csrf_failure_page(),
            Self::BadRequest(msg) => pages::errors::bad_request_page(msg),
            Self::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                pages::errors::server_error_page()
            }
        };

        (status, Html(page.into_string())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
