use crate::gate::{Exchange, SsoGate};
use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{get, options},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod handlers;

/// Build the router serving the gate.
#[must_use]
pub fn router<E: Exchange + 'static>(gate: Arc<SsoGate<E>>) -> Router {
    let cors = CorsLayer::new()
        // allow `GET` when accessing the resource
        .allow_methods([Method::GET])
        // allow requests from any origin
        .allow_origin(Any);

    Router::new()
        .route("/navigate", get(handlers::navigate::<E>))
        .route("/decision", get(handlers::decision::<E>))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(gate)),
        )
        // OPTIONS would be answered as a CORS preflight inside the layers
        .route("/health", options(handlers::health))
}

/// Serve the gate until ctrl-c.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new<E: Exchange + 'static>(port: u16, gate: Arc<SsoGate<E>>) -> Result<()> {
    let app = router(gate);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    // Cookies are forwarded to the exchange, keep them out of the span.
    debug_span!("http-request", path, request_id)
}
