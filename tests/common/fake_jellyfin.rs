//! In-process stand-in for the media server's `/Items` endpoint.
//!
//! Serves a fixed album list in pages, checks the token header and records
//! every query it receives so tests can assert on the pagination protocol.

use super::constants::*;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_reconciler::catalog::TOKEN_HEADER;
use catalog_reconciler::AlbumRecord;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// How the fake server answers page requests.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(dead_code)]
pub enum FakeJellyfinMode {
    /// Pages sliced from the album list, with the true total.
    Normal,
    /// Claims this many records but returns nothing past the first page.
    InflatedTotal(usize),
    /// Never returns more than this many items per page.
    ShortPages(usize),
    /// Answers 200 with a body that is not JSON.
    MalformedBody,
}

struct FakeState {
    albums: Vec<AlbumRecord>,
    mode: FakeJellyfinMode,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

/// A running fake server. Shuts down when dropped.
pub struct FakeJellyfin {
    pub base_url: String,
    state: Arc<FakeState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn param(query: &HashMap<String, String>, name: &str) -> usize {
    query.get(name).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn item_json(album: &AlbumRecord) -> serde_json::Value {
    json!({
        "Id": album.external_id,
        "Name": album.title,
        "AlbumArtist": album.primary_contributor,
        "ProductionYear": album.release_year,
        "Type": "MusicAlbum",
    })
}

async fn list_items(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.queries.lock().unwrap().push(query.clone());

    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if token != VALID_TOKEN {
        return (StatusCode::UNAUTHORIZED, "Access token is invalid").into_response();
    }

    let start = param(&query, "StartIndex");
    let limit = param(&query, "Limit");

    let (end, total) = match state.mode {
        FakeJellyfinMode::MalformedBody => {
            return (StatusCode::OK, "<html>not json</html>").into_response();
        }
        FakeJellyfinMode::Normal => (start + limit, state.albums.len()),
        FakeJellyfinMode::ShortPages(max) => (start + limit.min(max), state.albums.len()),
        FakeJellyfinMode::InflatedTotal(total) => {
            let end = if start == 0 { limit } else { start };
            (end, total)
        }
    };

    let start = start.min(state.albums.len());
    let end = end.min(state.albums.len());
    let items: Vec<serde_json::Value> = state.albums[start..end].iter().map(item_json).collect();

    Json(json!({
        "Items": items,
        "TotalRecordCount": total,
        "StartIndex": start,
    }))
    .into_response()
}

impl FakeJellyfin {
    /// Starts the fake server on a random local port.
    pub async fn spawn(albums: Vec<AlbumRecord>, mode: FakeJellyfinMode) -> Self {
        let state = Arc::new(FakeState {
            albums,
            mode,
            queries: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/Items", get(list_items))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake media server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Number of `/Items` requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.queries.lock().unwrap().len()
    }

    /// Query parameters of every request, in arrival order.
    #[allow(dead_code)]
    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.state.queries.lock().unwrap().clone()
    }
}

impl Drop for FakeJellyfin {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
