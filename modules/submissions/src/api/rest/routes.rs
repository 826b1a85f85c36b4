use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::config::ResponseMode;
use crate::domain::service::SubmissionService;

pub fn register_routes(
    router: Router,
    service: Arc<SubmissionService>,
    login_mode: ResponseMode,
) -> Router {
    // GET / - login page
    // POST /login - form intake, mode-dependent answer
    // POST /submit - JSON intake
    // GET /success - confirmation page
    let routes = Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/submit", post(handlers::submit))
        .route(handlers::SUCCESS_PATH, get(handlers::success))
        .layer(Extension(service))
        .layer(Extension(login_mode));

    router.merge(routes)
}
