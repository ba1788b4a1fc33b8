//! String similarity used for "did you mean" suggestions
//!
//! Levenshtein edit distance plus the substring-or-distance rule that decides
//! whether a candidate key is close enough to a query to be suggested.

/// Default maximum edit distance for a candidate to count as similar
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 3;

/// Levenshtein distance between `a` and `b` (insert, delete, substitute = 1).
///
/// Case-sensitive; callers lowercase first if they want otherwise.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rolling rows of the DP matrix
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            curr[j] = if a_chars[i - 1] == b_chars[j - 1] {
                prev[j - 1]
            } else {
                (prev[j - 1] + 1).min(curr[j - 1] + 1).min(prev[j] + 1)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// True when `candidate` contains `query` ignoring case, or is within
/// `max_distance` edits of it.
pub fn is_similar(candidate: &str, query: &str, max_distance: usize) -> bool {
    candidate.to_lowercase().contains(&query.to_lowercase())
        || levenshtein_distance(candidate, query) <= max_distance
}
