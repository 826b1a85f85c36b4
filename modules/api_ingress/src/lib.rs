//! HTTP host: owns the listening socket, the shared middleware stack and
//! the router-level fallbacks. Feature modules hand it a `Router` with their
//! routes already registered.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{error_handling::HandleErrorLayer, middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};

mod config;
pub mod error;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
use runtime::ServerConfig;

pub struct ApiIngress {
    config: ApiIngressConfig,
    timeout: Option<Duration>,
}

impl ApiIngress {
    pub const NAME: &'static str = "api_ingress";

    /// Create the host, filling `bind_addr` from the server section when unset.
    pub fn new(server: &ServerConfig, mut config: ApiIngressConfig) -> Self {
        if config.bind_addr.trim().is_empty() {
            config.bind_addr = server.bind_addr();
        }
        let timeout = (server.timeout_sec > 0).then(|| Duration::from_secs(server.timeout_sec));
        Self { config, timeout }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap module routes with health, fallbacks and the middleware stack.
    ///
    /// Layers, outermost first: SetRequestId -> PropagateRequestId -> Trace ->
    /// push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit.
    pub fn build_router(&self, routes: Router) -> Router {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes)
            .method_not_allowed_fallback(web::method_not_allowed)
            .fallback(web::not_found);

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        if let Some(timeout) = self.timeout {
            // Elapsed requests answer 504 with the JSON error body
            router = router.layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(web::handle_middleware_error))
                    .layer(TimeoutLayer::new(timeout)),
            );
        }

        let x_request_id = request_id::header();
        router
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.bind_addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);
        Ok(listener)
    }

    /// Serve until `cancel` fires, then drain in-flight requests.
    pub async fn serve(
        listener: TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn ingress(config: ApiIngressConfig) -> ApiIngress {
        ApiIngress::new(&ServerConfig::default(), config)
    }

    #[test]
    fn test_bind_addr_defaults_to_server_section() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 5050,
            ..Default::default()
        };
        let host = ApiIngress::new(&server, ApiIngressConfig::default());
        assert_eq!(host.config().bind_addr, "127.0.0.1:5050");

        let explicit = ApiIngress::new(
            &server,
            ApiIngressConfig {
                bind_addr: "0.0.0.0:7000".into(),
                ..Default::default()
            },
        );
        assert_eq!(explicit.config().bind_addr, "0.0.0.0:7000");
    }

    #[tokio::test]
    async fn test_health_route() {
        let router = ingress(ApiIngressConfig::default()).build_router(Router::new());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let router = ingress(ApiIngressConfig::default()).build_router(Router::new());
        let response = router
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Not found");
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_405() {
        let router = ingress(ApiIngressConfig::default()).build_router(Router::new());
        let response = router
            .oneshot(
                Request::post("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_body_limit_rejects_large_payload() {
        use axum::routing::post;

        let routes = Router::new().route(
            "/echo",
            post(|body: axum::body::Bytes| async move { body.len().to_string() }),
        );
        let router = ingress(ApiIngressConfig {
            body_limit_bytes: 16,
            ..Default::default()
        })
        .build_router(routes);

        let response = router
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "64")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_elapsed_request_is_json_504() {
        let routes = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                "late"
            }),
        );
        let server = ServerConfig {
            timeout_sec: 1,
            ..Default::default()
        };
        let router = ApiIngress::new(&server, ApiIngressConfig::default()).build_router(routes);

        let response = router
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Request timed out");
    }

    #[tokio::test]
    async fn test_serve_and_shutdown() {
        let host = ApiIngress::new(
            &ServerConfig::default(),
            ApiIngressConfig {
                bind_addr: "127.0.0.1:0".into(),
                ..Default::default()
            },
        );
        let listener = host.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = host.build_router(Router::new());

        let cancel = CancellationToken::new();
        let server = tokio::spawn(ApiIngress::serve(listener, router, cancel.clone()));

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(resp.status().is_success());

        cancel.cancel();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_bind_addr() {
        let host = ingress(ApiIngressConfig {
            bind_addr: "not-an-address".into(),
            ..Default::default()
        });
        let err = host.bind().await.unwrap_err();
        assert!(err.to_string().contains("Invalid bind address"));
    }
}
