use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::api::rest::{dto::SubmissionRejected, pages};
use crate::domain::error::DomainError;

/// Map domain errors to HTTP status codes.
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::MissingData
        | DomainError::MissingFields { .. }
        | DomainError::InvalidField { .. } => StatusCode::BAD_REQUEST,
        DomainError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error envelope with the mapped status.
pub fn json_error(err: &DomainError) -> Response {
    (status_for(err), Json(SubmissionRejected::from(err))).into_response()
}

/// HTML error page with the mapped status.
pub fn html_error(err: &DomainError) -> Response {
    (status_for(err), Html(pages::error_page(&err.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_400_persistence_is_500() {
        assert_eq!(status_for(&DomainError::missing_data()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&DomainError::missing_fields(vec!["email".into()])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::invalid_field("email")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::persistence("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn html_error_keeps_status() {
        let resp = html_error(&DomainError::persistence("down"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html")));
    }
}
