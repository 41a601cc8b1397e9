//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve the fixed pages and the wildcard static route
//! - Relay POST bodies to the ingest socket and redirect
//! - Stop accepting on the shutdown signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::HttpConfig;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::{file_response, html_page, not_found, submitted_redirect};
use crate::http::statics::{guess_mime, SiteRoot, INDEX_PAGE, MESSAGE_PAGE};
use crate::net::Relay;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteRoot>,
    pub relay: Relay,
    pub max_body_bytes: usize,
}

/// HTTP front end.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server relaying submissions through `relay`.
    pub fn new(config: &HttpConfig, relay: Relay) -> Self {
        let state = AppState {
            site: Arc::new(SiteRoot::new(&config.site_root)),
            relay,
            max_body_bytes: config.max_body_bytes,
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &HttpConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, e.g. for driving requests in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point: routes on method, then on exact path.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = match method {
        Method::POST => submit(&state, request.into_body()).await,
        Method::GET | Method::HEAD => serve_get(&state, &path).await,
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD, POST")],
        )
            .into_response(),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn serve_get(state: &AppState, path: &str) -> Response {
    match path {
        "/" => html_page(&state.site, INDEX_PAGE).await,
        "/message.html" => html_page(&state.site, MESSAGE_PAGE).await,
        _ => {
            let Some(file) = state.site.resolve(path).await else {
                tracing::debug!(path = %path, "No such static file");
                return not_found(&state.site).await;
            };
            match file_response(&file, guess_mime(&file), StatusCode::OK).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(path = %file.display(), error = %e, "Failed to read static file");
                    not_found(&state.site).await
                }
            }
        }
    }
}

/// Relay the raw body and redirect. The client is not told whether the
/// submission was delivered or stored.
async fn submit(state: &AppState, body: Body) -> Response {
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(limit = state.max_body_bytes, "Submission body too large");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Submission body aborted");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    state.relay.send(&bytes).await;
    submitted_redirect()
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
