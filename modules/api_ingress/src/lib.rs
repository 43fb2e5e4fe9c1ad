//! HTTP edge of the users server: request ids, tracing, timeouts, CORS,
//! body limits, the `/health` check and the listener itself.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Module name used for the `modules.<name>` config section.
pub const NAME: &str = "api_ingress";

/// Wrap application routes with `/health` and the shared middleware stack.
///
/// Order, outermost to innermost:
/// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
/// -> Timeout -> CORS -> BodyLimit. `Router::layer` wraps everything added
/// before it, so layers are applied innermost first.
pub fn build_router(routes: Router, cfg: &ApiIngressConfig) -> Router {
    let x_request_id = request_id::header();

    let mut router = routes.route("/health", get(web::health_check));

    // The tower-http limit is the only one; axum's 2 MiB extractor default is off.
    router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router = router
        .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
        .layer(from_fn(request_id::push_req_id_to_extensions))
        .layer(request_id::create_trace_layer())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

    router
}

/// Bind `addr` and serve `router` until `shutdown` resolves.
pub async fn serve<F>(router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .context("HTTP server terminated with an error")
}
