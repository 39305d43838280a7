//! HTTP client for a Jellyfin-compatible media server item listing.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::fetcher::{CatalogSource, FetchError};
use super::models::{AlbumRecord, CatalogPage};

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-MediaBrowser-Token";

/// Item fields requested from the server, only what an [`AlbumRecord`] needs.
pub const REQUESTED_FIELDS: &str = "PrimaryImageTag,AlbumArtist,AlbumArtists,ProductionYear,Overview";

#[derive(Debug, Deserialize)]
struct NameId {
    #[serde(rename = "Name", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemDto {
    #[serde(rename = "Id", default)]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "AlbumArtist", default)]
    album_artist: Option<String>,
    #[serde(rename = "AlbumArtists", default)]
    album_artists: Option<Vec<NameId>>,
    #[serde(rename = "ProductionYear", default)]
    production_year: Option<i32>,
    #[serde(rename = "Overview", default)]
    overview: Option<String>,
    #[serde(rename = "PrimaryImageTag", default)]
    primary_image_tag: Option<String>,
    #[serde(rename = "ImageTags", default)]
    image_tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "Items", default)]
    items: Vec<ItemDto>,
    #[serde(rename = "TotalRecordCount", default)]
    total_record_count: usize,
    #[serde(rename = "StartIndex", default)]
    start_index: Option<usize>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ItemDto> for AlbumRecord {
    fn from(item: ItemDto) -> Self {
        let primary_contributor = match non_empty(item.album_artist) {
            Some(artist) => artist,
            None => item
                .album_artists
                .iter()
                .flatten()
                .filter_map(|a| a.name.as_deref())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        let image_ref = non_empty(item.primary_image_tag)
            .or_else(|| item.image_tags.and_then(|mut tags| tags.remove("Primary")));

        AlbumRecord {
            external_id: non_empty(item.id),
            title: item.name.unwrap_or_default(),
            primary_contributor,
            release_year: item.production_year.unwrap_or(0),
            description: non_empty(item.overview),
            image_ref,
        }
    }
}

/// Paginated album listing over the media server's `/Items` endpoint.
pub struct JellyfinClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl JellyfinClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the media server (e.g., "http://localhost:8096")
    /// * `token` - API key or user session token
    /// * `timeout_sec` - Per-request timeout in seconds
    pub fn new(base_url: String, token: String, timeout_sec: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .user_agent(concat!("catalog-reconciler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogSource for JellyfinClient {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<CatalogPage, FetchError> {
        let url = format!("{}/Items", self.base_url);
        let start_index = offset.to_string();
        let limit = limit.to_string();

        debug!(url = %url, offset, "Requesting catalog page");

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .query(&[
                ("IncludeItemTypes", "MusicAlbum"),
                ("Recursive", "true"),
                ("SortBy", "SortName"),
                ("SortOrder", "Ascending"),
                ("StartIndex", start_index.as_str()),
                ("Limit", limit.as_str()),
                ("Fields", REQUESTED_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Auth {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))?;
        let parsed: ItemsResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Decode(format!("Failed to parse items response: {}", e)))?;

        Ok(CatalogPage {
            items: parsed.items.into_iter().map(AlbumRecord::from).collect(),
            total_count: parsed.total_record_count,
            returned_offset: parsed.start_index.unwrap_or(offset),
        })
    }
}
