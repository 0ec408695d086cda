use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::data::ResultStore;

pub mod api;
pub mod routes;

use routes::HttpResponse;

/// Shared server state. Handlers hold the store lock for the whole request, so writes to
/// one tournament never interleave.
#[derive(Debug)]
pub struct AppState {
    pub store: Mutex<ResultStore>,
}

impl AppState {
    pub fn new(store: ResultStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(ResultStore::in_memory())
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> HttpResponse {
    let path = uri.path().to_string();
    let method = method.as_str().to_string();

    // Routing is synchronous and may touch the store file.
    let handled =
        tokio::task::spawn_blocking(move || routes::route_request(&state, &method, &path, &body))
            .await;
    match handled {
        Ok(response) => response,
        Err(err) => {
            error!(%err, "request handler failed");
            routes::error_response(500, "Internal server error")
        }
    }
}

pub fn run_server(bind_addr: &str, store: ResultStore) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(bind_addr, Arc::new(AppState::new(store))))
}

pub async fn serve(bind_addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("weighin server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
