use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// error returned by Api
#[derive(Debug, PartialEq, Error)]
pub enum ApiErr {
    #[error("User not found")]
    UserNotExist,
    #[error("User already exists")]
    UserExist,
    #[error("Company not found")]
    CompanyNotExist,
    #[error("Company already exists")]
    CompanyExist,
    #[error("Follow not found")]
    FollowNotExist,
    #[error("Already following this user")]
    DuplicateFollow,
    #[error("An account cannot follow itself")]
    SelfFollow,
    #[error("Wrong password")]
    WrongPassword,
    #[error("Invalid request parameter")]
    InvalidParam,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Could not process password")]
    PasswordHash,
    #[error("Could not issue token")]
    TokenCreation,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = match self {
            ApiErr::UserNotExist
            | ApiErr::CompanyNotExist
            | ApiErr::FollowNotExist
            | ApiErr::InvalidToken => StatusCode::NOT_FOUND,
            ApiErr::UserExist | ApiErr::CompanyExist | ApiErr::DuplicateFollow => {
                StatusCode::CONFLICT
            }
            ApiErr::SelfFollow => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErr::WrongPassword | ApiErr::TokenExpired | ApiErr::InvalidParam => {
                StatusCode::BAD_REQUEST
            }
            ApiErr::PasswordHash | ApiErr::TokenCreation | ApiErr::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            // Connection details stay in the logs, not in the response body.
            ApiErr::Db(err) => {
                tracing::error!("database error: {err}");
                "The server cannot process the request".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}
