//! Test data shared by the end-to-end suites.

use catalog_reconciler::AlbumRecord;

/// Header row of a reference export, twelve columns wide.
pub const REFERENCE_HEADER: &str = "RYM Album,First Name,Last Name,First Name localized,Last Name localized,Title,Release_Date,Rating,Ownership,Purchase Date,Media Type,Review";

/// Local catalog served by [`super::TestServer::spawn`], already sorted by
/// contributor then title.
pub fn local_catalog() -> Vec<AlbumRecord> {
    vec![
        AlbumRecord::new("Kind of Blue", "Miles Davis")
            .with_external_id("local-1")
            .with_release_year(1959),
        AlbumRecord::new("Dummy", "Portishead")
            .with_external_id("local-2")
            .with_release_year(1994),
        AlbumRecord::new("OK Computer", "Radiohead")
            .with_external_id("local-3")
            .with_release_year(1997),
        AlbumRecord::new("Abbey Road", "The Beatles")
            .with_external_id("local-4")
            .with_release_year(1969),
    ]
}

/// `count` distinct albums, named so their order is stable.
pub fn numbered_albums(count: usize) -> Vec<AlbumRecord> {
    (0..count)
        .map(|i| {
            AlbumRecord::new(format!("Album {:04}", i), format!("Artist {:04}", i))
                .with_external_id(format!("item-{}", i))
                .with_release_year(2000 + (i % 20) as i32)
        })
        .collect()
}

/// Builds a reference export from `(first name, last name, title, release)` rows.
pub fn reference_csv(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut text = String::from(REFERENCE_HEADER);
    for (idx, (first, last, title, release)) in rows.iter().enumerate() {
        text.push_str(&format!(
            "\n{},{},{},,,{},{},,,,,",
            idx + 1,
            first,
            last,
            title,
            release
        ));
    }
    text
}
