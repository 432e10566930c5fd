use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use cyberguard_application::AppError;
use cyberguard_domain::{ErrorKind, RiskError};

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Risk(RiskError),
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Risk(err) => HttpError::Risk(err),
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::Internal(err) => HttpError::Internal(format!("{:#}", err)),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::EntityNotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateEntity | ErrorKind::AnalysisAlreadyInProgress => StatusCode::CONFLICT,
        ErrorKind::InvalidScore => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Cancelled => StatusCode::CONFLICT,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ModelError => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            HttpError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", format!("bad request: {}", msg))
            }
            HttpError::Risk(err) => {
                let kind = err.kind();
                (status_for(kind), kind.as_str(), err.to_string())
            }
            HttpError::Internal(msg) => {
                error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };
        (status, Json(ErrorBody { error: message, kind })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberguard_domain::EntityId;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (RiskError::EntityNotFound(EntityId(9)), StatusCode::NOT_FOUND),
            (RiskError::DuplicateEntity(EntityId(1)), StatusCode::CONFLICT),
            (RiskError::AnalysisAlreadyInProgress(EntityId(1)), StatusCode::CONFLICT),
            (RiskError::InvalidScore(101), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            let response = HttpError::from(AppError::Risk(err)).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn bad_request_and_internal() {
        let response = HttpError::from(AppError::BadRequest("empty name".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response =
            HttpError::from(AppError::Internal(anyhow::anyhow!("actor stopped"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
