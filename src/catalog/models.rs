use serde::{Deserialize, Serialize};

/// One album as known by either the local or the reference catalog.
///
/// Records are immutable values: the stored `title` and `primary_contributor`
/// keep their original casing and diacritics, normalization happens only at
/// comparison time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    /// Source-specific identifier (media server item id, reference catalog id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub title: String,
    /// May be empty when the source does not know the artist.
    pub primary_contributor: String,
    /// 0 when unknown.
    #[serde(default)]
    pub release_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl AlbumRecord {
    pub fn new(title: impl Into<String>, primary_contributor: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            primary_contributor: primary_contributor.into(),
            ..Default::default()
        }
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = year;
        self
    }
}

/// One page of a paginated catalog listing. Only lives while a fetch is running.
#[derive(Clone, Debug, Default)]
pub struct CatalogPage {
    pub items: Vec<AlbumRecord>,
    /// Total number of records the server claims to hold.
    pub total_count: usize,
    /// Offset the server reports for the first item of this page.
    pub returned_offset: usize,
}

/// Sorts a catalog by contributor, then title, both compared case-insensitively.
/// The sort is stable so records with equal keys keep their server order.
pub fn sort_by_contributor_then_title(albums: &mut [AlbumRecord]) {
    albums.sort_by_cached_key(|album| {
        (
            album.primary_contributor.to_lowercase(),
            album.title.to_lowercase(),
        )
    });
}
