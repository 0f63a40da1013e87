use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Auth(err) => (err.status(), err.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Identity-layer failures with the user-facing Turkish messages the
/// frontend has always shown for them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Bu e-posta adresi zaten kullanımda")]
    EmailInUse,

    #[error("Şifre en az 6 karakter olmalı")]
    WeakPassword,

    #[error("Geçersiz e-posta adresi")]
    InvalidEmail,

    #[error("Hatalı şifre")]
    WrongPassword,

    #[error("Bu e-posta ile kayıtlı kullanıcı bulunamadı")]
    UserNotFound,

    #[error("Hesabınız askıya alınmış{}", reason_suffix(.0))]
    Banned(Option<String>),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {}", r),
        None => String::new(),
    }
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::EmailInUse => StatusCode::CONFLICT,
            AuthError::WeakPassword | AuthError::InvalidEmail => StatusCode::BAD_REQUEST,
            AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Banned(_) => StatusCode::FORBIDDEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            response_status(AppError::Forbidden("yasak".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            response_status(AppError::Conflict("taken".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        assert_eq!(
            response_status(AuthError::EmailInUse.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            response_status(AuthError::WeakPassword.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AuthError::InvalidEmail.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AuthError::WrongPassword.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            response_status(AuthError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            response_status(AuthError::Banned(None).into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn auth_error_message_survives_conversion() {
        let err: AppError = AuthError::WrongPassword.into();
        assert_eq!(err.to_string(), "Hatalı şifre");
        let err: AppError = AuthError::UserNotFound.into();
        assert_eq!(err.to_string(), "Bu e-posta ile kayıtlı kullanıcı bulunamadı");
    }

    #[test]
    fn auth_error_messages_are_turkish() {
        assert_eq!(
            AuthError::EmailInUse.to_string(),
            "Bu e-posta adresi zaten kullanımda"
        );
        assert_eq!(
            AuthError::WeakPassword.to_string(),
            "Şifre en az 6 karakter olmalı"
        );
        assert_eq!(
            AuthError::UserNotFound.to_string(),
            "Bu e-posta ile kayıtlı kullanıcı bulunamadı"
        );
    }

    #[test]
    fn banned_message_includes_reason_when_present() {
        let err = AuthError::Banned(Some("spam".into()));
        assert_eq!(err.to_string(), "Hesabınız askıya alınmış: spam");
        assert_eq!(
            AuthError::Banned(None).to_string(),
            "Hesabınız askıya alınmış"
        );
    }
}
