use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

const SERVER_ERROR_MESSAGE: &str = "Terjadi kesalahan pada server.";

/// Errors a handler can end with. Validation failures are not errors: they
/// redirect back to the form.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The named record does not exist.
    #[error("{0} tidak ditemukan.")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Writing or deleting a cover file failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Multipart(err) => (err.status(), err.body_text()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (
            status,
            Json(json!({
                "status": "error",
                "message": message
            })),
        )
            .into_response()
    }
}

/// `RowNotFound` is a 404, a broken category reference (Postgres 23503) is
/// the caller's fault, everything else is a 500 with a generic message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "Data tidak ditemukan.".to_string()),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => (
            StatusCode::BAD_REQUEST,
            "Kategori tidak ditemukan.".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                SERVER_ERROR_MESSAGE.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Film").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn io_failure_maps_to_500() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_message_names_the_record() {
        assert_eq!(AppError::NotFound("Film").to_string(), "Film tidak ditemukan.");
    }
}
