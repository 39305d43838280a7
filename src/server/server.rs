use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use super::{log_requests, state::*, ServerConfig};
use crate::catalog::{fetch_all_albums, sort_by_contributor_then_title, AlbumRecord};
use crate::matching::reconcile;
use crate::reference::{parse_reference_catalog, InputFormatError};

/// Largest accepted reference upload.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Multipart field carrying an uploaded file.
const CSV_FILE_FIELD: &str = "csvfile";
/// Form field carrying pasted text, used when no file was uploaded.
const CSV_TEXT_FIELD: &str = "csvtext";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub local_albums: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct ReconcileForm {
    #[serde(default)]
    pub csvtext: Option<String>,
}

/// Result of reconciling an uploaded reference catalog against the local one.
#[derive(Serialize, Debug, Default)]
pub struct ReconcileResponse {
    /// Local albums with no match in the reference catalog.
    pub missing: Vec<AlbumRecord>,
    pub matched: usize,
    /// The parsed reference catalog the local one was compared with.
    pub reference: Vec<AlbumRecord>,
    pub rejected_rows: Vec<InputFormatError>,
    pub error: Option<String>,
}

impl ReconcileResponse {
    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct RefreshResponse {
    local_albums: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        local_albums: state.local_catalog_snapshot().len(),
    };
    Json(stats)
}

async fn get_albums(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.local_catalog_snapshot().as_ref().clone())
}

fn bad_request(message: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message)
}

/// Pulls the reference catalog text out of a multipart upload, a url-encoded
/// form, or a raw body, in that order of preference.
async fn read_reference_input(request: Request) -> Result<Vec<u8>, (StatusCode, String)> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| bad_request(e.body_text()))?;

        let mut file: Option<Vec<u8>> = None;
        let mut text: Option<Vec<u8>> = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(e.body_text()))?
        {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                CSV_FILE_FIELD => {
                    let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                    if !bytes.is_empty() {
                        file = Some(bytes.to_vec());
                    }
                }
                CSV_TEXT_FIELD => {
                    let value = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                    text = Some(value.into_bytes());
                }
                _ => {}
            }
        }
        Ok(file.or(text).unwrap_or_default())
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<ReconcileForm>::from_request(request, &())
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        Ok(form.csvtext.unwrap_or_default().into_bytes())
    } else {
        let bytes = Bytes::from_request(request, &())
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        Ok(bytes.to_vec())
    }
}

async fn reconcile_reference(State(state): State<ServerState>, request: Request) -> Response {
    let input = match read_reference_input(request).await {
        Ok(input) => input,
        Err(rejection) => return rejection.into_response(),
    };

    let reference = match parse_reference_catalog(&input) {
        Ok(reference) => reference,
        Err(err) => {
            warn!("Rejected reference catalog: {}", err);
            let body = ReconcileResponse::failed(format!("Parse error: {}", err));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let local = state.local_catalog_snapshot();
    let policy = state.config.match_policy.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = reconcile(&local, &reference.albums, &policy);
        (result, reference)
    })
    .await;

    match outcome {
        Ok((result, reference)) => Json(ReconcileResponse {
            missing: result.unique,
            matched: result.matched,
            reference: reference.albums,
            rejected_rows: reference.rejected_rows,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Reconciliation task failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn refresh_catalog(State(state): State<ServerState>) -> Response {
    let source = match &state.catalog_source {
        Some(source) => source.clone(),
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "No catalog source configured",
            )
                .into_response()
        }
    };

    match fetch_all_albums(source.as_ref(), state.config.page_size, &state.shutdown).await {
        Ok(mut albums) => {
            sort_by_contributor_then_title(&mut albums);
            let local_albums = albums.len();
            state.replace_local_catalog(albums);
            info!("Local catalog refreshed, {} albums", local_albums);
            Json(RefreshResponse { local_albums }).into_response()
        }
        Err(err) => {
            error!("Failed to refresh local catalog: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    local_catalog: Vec<AlbumRecord>,
    catalog_source: OptionalCatalogSource,
    shutdown: CancellationToken,
) -> Router {
    let state = ServerState::new(config.clone(), local_catalog, catalog_source, shutdown);

    let api_routes: Router = Router::new()
        .route("/albums", get(get_albums))
        .route(
            "/reconcile",
            post(reconcile_reference).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/catalog/refresh", post(refresh_catalog))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/v1", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    local_catalog: Vec<AlbumRecord>,
    catalog_source: OptionalCatalogSource,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, local_catalog, catalog_source, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
