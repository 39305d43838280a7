//! Full-catalog retrieval over a paginated source.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::models::{AlbumRecord, CatalogPage};

/// Number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Catalog source rejected the request (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Malformed catalog page: {0}")]
    Decode(String),

    #[error("Catalog fetch cancelled")]
    Cancelled,
}

/// A read-only, paginated listing of albums.
///
/// Implementations fetch a single page; [`fetch_all_albums`] drives the
/// iteration and decides when the catalog is complete.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<CatalogPage, FetchError>;
}

/// True once everything the server announced has arrived, or the server
/// handed back an empty page (it misreported its total).
fn pagination_finished(received: usize, total_count: usize, page_len: usize) -> bool {
    received >= total_count || page_len == 0
}

/// Retrieves the whole catalog from `source`, page by page.
///
/// Pages are requested sequentially starting at offset 0. The offset advances
/// by the number of items actually returned, so short pages are handled.
/// Any failure aborts the fetch and no partial catalog is returned.
pub async fn fetch_all_albums(
    source: &dyn CatalogSource,
    page_size: usize,
    cancel: &CancellationToken,
) -> Result<Vec<AlbumRecord>, FetchError> {
    let page_size = page_size.max(1);
    let mut albums: Vec<AlbumRecord> = Vec::new();
    let mut offset = 0;
    let mut pages = 0;

    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            page = source.fetch_page(offset, page_size) => page?,
        };
        pages += 1;

        let page_len = page.items.len();
        debug!(
            offset,
            returned = page_len,
            total = page.total_count,
            "Fetched catalog page"
        );

        albums.extend(page.items);
        offset += page_len;

        if pagination_finished(offset, page.total_count, page_len) {
            if page_len == 0 && offset < page.total_count {
                debug!(
                    "Empty page at offset {} while server reports {} items, stopping",
                    offset, page.total_count
                );
            }
            break;
        }
    }

    info!("Fetched {} albums in {} pages", albums.len(), pages);
    Ok(albums)
}
