//! Edit-distance based closeness score.

/// Number of single code point insertions, deletions or substitutions
/// needed to turn `a` into `b`.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_distance(&a, &b)
}

fn edit_distance(source: &[char], target: &[char]) -> usize {
    // Keep the row along the shorter input
    let (outer, inner) = if source.len() < target.len() {
        (target, source)
    } else {
        (source, target)
    };
    if inner.is_empty() {
        return outer.len();
    }

    // costs[j] holds the distance from the current outer prefix to inner[..j]
    let mut costs: Vec<usize> = (0..=inner.len()).collect();

    for (i, &outer_char) in outer.iter().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = i + 1;

        for (j, &inner_char) in inner.iter().enumerate() {
            let above = costs[j + 1];
            let substitution = diagonal + usize::from(outer_char != inner_char);
            costs[j + 1] = substitution.min(above + 1).min(costs[j] + 1);
            diagonal = above;
        }
    }

    costs[inner.len()]
}

/// Closeness of two already-normalized strings, in `[0, 1]`.
///
/// Returns `1 - distance / max_len` with lengths counted in code points.
/// An empty side carries no evidence of a match, so it always scores 0,
/// including when both sides are empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());

    1.0 - edit_distance(&a, &b) as f64 / longest as f64
}
