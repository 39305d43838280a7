//! Catalog Reconciler Library
//!
//! Fetches the local album catalog from a media server, parses reference
//! catalogs and reports which local albums are missing from the reference.
//! The modules are exposed for testing and reuse by the binary.

pub mod catalog;
pub mod config;
pub mod matching;
pub mod reference;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{fetch_all_albums, AlbumRecord, CatalogSource, FetchError, JellyfinClient};
pub use matching::{normalize, reconcile, similarity, MatchPolicy, ReconciliationResult};
pub use reference::{parse_reference_catalog, InputFormatError, ReferenceCatalog};
pub use server::{run_server, RequestsLoggingLevel};
