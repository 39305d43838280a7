mod fetcher;
mod jellyfin;
mod models;

pub use fetcher::{fetch_all_albums, CatalogSource, FetchError, DEFAULT_PAGE_SIZE};
pub use jellyfin::{JellyfinClient, REQUESTED_FIELDS, TOKEN_HEADER};
pub use models::{sort_by_contributor_then_title, AlbumRecord, CatalogPage};
