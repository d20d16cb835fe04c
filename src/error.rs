use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::api::shared::ResponseType;
use crate::services::admin_form::FormError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] FormError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Video not found!")]
    NotFound(String),

    #[error("anonymous session required")]
    Unauthorized,

    #[error("deletion must be confirmed with confirm=true")]
    ConfirmationRequired,

    /// A create/update/delete the store refused. `notice` is what the admin
    /// sees; the form is left as submitted.
    #[error("{notice}")]
    StoreWrite {
        notice: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Database error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a store failure on a write path, keeping not-found distinct.
    pub fn write_failed(notice: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::StoreWrite {
                notice,
                source: other,
            },
        }
    }

    fn cause(&self) -> String {
        match self {
            AppError::Validation(_) => "validation".to_string(),
            AppError::BadRequest(_) => "bad_request".to_string(),
            AppError::NotFound(id) => format!("not_found: {}", id),
            AppError::Unauthorized => "unauthorized".to_string(),
            AppError::ConfirmationRequired => "confirmation_required".to_string(),
            AppError::StoreWrite { source, .. } => source.to_string(),
            AppError::Store(_) => "store".to_string(),
            AppError::Internal(_) => "internal".to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Store(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::StoreWrite { .. } | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{} ({})", self, self.cause());
        }
        HttpResponse::build(self.status_code())
            .json(ResponseType::<String>::failure(self.cause(), self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failures_keep_not_found_separate() {
        let err = AppError::write_failed("Failed to update video.", StoreError::NotFound("x".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::write_failed(
            "Failed to update video.",
            StoreError::Database("connection reset".into()),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to update video.");
    }
}
