//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Routing is a plain
//! match on method and path segments below the configured prefix.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::db::store::DocumentStore;
use crate::routes;
use crate::types::{Result, ShlokaError};

/// Shared application state
pub struct AppState<S: DocumentStore> {
    pub args: Args,
    /// Store the seed reconciler has already brought up to date
    pub store: Arc<S>,
    pub started_at: Instant,
}

impl<S: DocumentStore> AppState<S> {
    pub fn new(args: Args, store: Arc<S>) -> Self {
        Self {
            args,
            store,
            started_at: Instant::now(),
        }
    }
}

/// Accept connections until the task is dropped
pub async fn run<S: DocumentStore>(state: Arc<AppState<S>>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Shloka listening on {} (routes under '{}')",
        state.args.listen,
        state.args.route_prefix()
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request<S: DocumentStore>(
    state: Arc<AppState<S>>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = dispatch(&state, &method, &path).await;
    Ok(response)
}

/// Route one request to its handler
pub async fn dispatch<S: DocumentStore>(
    state: &AppState<S>,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>> {
    if *method == Method::OPTIONS {
        return routes::preflight_response();
    }

    let Some(rest) = path.strip_prefix(state.args.route_prefix()) else {
        return not_found();
    };
    // "/api" must not match "/apis/..."
    if !rest.is_empty() && !rest.starts_with('/') {
        return not_found();
    }

    if *method != Method::GET {
        return routes::method_not_allowed();
    }

    // Segments are matched decoded; one that is not valid UTF-8 matches nothing
    let decoded: Vec<String> = match rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).map(|d| d.into_owned()))
        .collect::<std::result::Result<Vec<String>, _>>()
    {
        Ok(decoded) => decoded,
        Err(_) => return not_found(),
    };
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    match segments.as_slice() {
        [] => routes::json_response(StatusCode::OK, &routes::greeting()),
        ["health"] => routes::json_response(StatusCode::OK, &routes::health_check(state)),
        ["emotions"] => respond(routes::list_emotions(state).await),
        ["moods", emotion_id] => respond(routes::list_moods(state, emotion_id).await),
        ["guidance", mood_id] => respond(routes::get_guidance(state, mood_id).await),
        ["chapters"] => respond(routes::list_chapters(state).await),
        ["chapters", number] => respond(routes::get_chapter(state, number).await),
        _ => not_found(),
    }
}

fn respond<T: serde::Serialize>(result: Result<T>) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => routes::json_response(StatusCode::OK, &body),
        Err(e) => routes::error_response(&e),
    }
}

fn not_found() -> Response<Full<Bytes>> {
    routes::error_response(&ShlokaError::NotFound("Not Found".into()))
}
