use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use tracing::info;

use crate::api::rest::{body::parse_body, dto::SubmissionAccepted, error, pages};
use crate::config::ResponseMode;
use crate::contract::{SubmissionForm, SubmissionRecord};
use crate::domain::error::DomainError;
use crate::domain::service::{Endpoint, SubmissionService};

pub const SUCCESS_PATH: &str = "/success";

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

async fn accept(
    svc: &SubmissionService,
    endpoint: Endpoint,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SubmissionRecord, DomainError> {
    info!(
        %endpoint,
        content_type = content_type(headers).unwrap_or("-"),
        bytes = body.len(),
        "submission received"
    );
    let form: SubmissionForm = parse_body(content_type(headers), body)?;
    svc.submit(endpoint, &form).await
}

/// GET / - login form built from the login schema
pub async fn index(Extension(svc): Extension<Arc<SubmissionService>>) -> Html<String> {
    Html(pages::login_page(svc.schema(Endpoint::Login)))
}

/// GET /success
pub async fn success() -> Html<String> {
    Html(pages::success_page())
}

/// POST /login - answers according to the configured response mode
pub async fn login(
    Extension(svc): Extension<Arc<SubmissionService>>,
    Extension(mode): Extension<ResponseMode>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match accept(&svc, Endpoint::Login, &headers, &body).await {
        Ok(record) => match mode {
            ResponseMode::Redirect => Redirect::to(SUCCESS_PATH).into_response(),
            ResponseMode::Page => {
                let field = svc.schema(Endpoint::Login).identifying_field();
                let value = record.get(field).unwrap_or_default();
                Html(pages::confirmation_page(field, value)).into_response()
            }
            ResponseMode::Json => Json(SubmissionAccepted::from(record)).into_response(),
        },
        Err(e) => match mode {
            ResponseMode::Json => error::json_error(&e),
            ResponseMode::Redirect | ResponseMode::Page => error::html_error(&e),
        },
    }
}

/// POST /submit - always JSON
pub async fn submit(
    Extension(svc): Extension<Arc<SubmissionService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match accept(&svc, Endpoint::Submit, &headers, &body).await {
        Ok(record) => Json(SubmissionAccepted::from(record)).into_response(),
        Err(e) => error::json_error(&e),
    }
}
