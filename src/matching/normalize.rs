use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize free text for comparison.
///
/// Lower-cases, decomposes (NFD) and drops combining marks so accented
/// letters fold onto their base letter, keeps only letters, digits and
/// whitespace, then collapses whitespace runs into single spaces.
///
/// ```
/// use catalog_reconciler::matching::normalize;
///
/// assert_eq!(normalize("  Beyoncé -- Lemonade! "), "beyonce lemonade");
/// assert_eq!(normalize("?!*"), "");
/// ```
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();

    let kept: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphabetic() || c.is_numeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
