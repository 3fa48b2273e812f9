use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Boundary error for all request handlers. Every variant maps to exactly
/// one HTTP status; anything unexpected is caught as `Db`/`Internal` and
/// surfaced as a logged 500.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many uploads. Try again later.")]
    RateLimited,

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Db(_) | ApiError::Pool(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Internal error while handling request: {}", self);
            // Do not leak database details to the client.
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "An internal error occurred." }));
        }
        HttpResponse::build(self.status_code())
            .json(json!({ "success": false, "error": self.to_string() }))
    }
}

impl ApiError {
    /// Maps the "no rows" case onto a 404 for single-row lookups.
    pub fn not_found_on_no_rows(err: rusqlite::Error, entity: &'static str) -> ApiError {
        match err {
            rusqlite::Error::QueryReturnedNoRows => ApiError::NotFound(entity),
            other => ApiError::Db(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            ApiError::Unauthorized("Not logged in.").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::NotFound("News").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn rate_limited_maps_to_429() {
        assert_eq!(
            ApiError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn no_rows_becomes_not_found() {
        let err = ApiError::not_found_on_no_rows(rusqlite::Error::QueryReturnedNoRows, "News");
        assert!(matches!(err, ApiError::NotFound("News")));
    }
}
