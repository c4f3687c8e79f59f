//! Approximate string scores on a 0 to 100 scale.
//!
//! Built on `strsim`'s normalized Levenshtein similarity. All offsets are
//! character offsets, not byte offsets.

use strsim::normalized_levenshtein;

/// Best-aligned window of the second argument of [`partial_ratio_alignment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub score: f64,
    pub dest_start: usize,
    pub dest_end: usize,
}

/// Whole-string similarity.
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Similarity of the shorter string to its best-matching window in the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    partial_ratio_alignment(a, b).map_or(0.0, |alignment| alignment.score)
}

/// Like [`partial_ratio`], also reporting which window of `b` scored best.
///
/// When `a` is longer than `b` the whole of `b` is the window. Returns
/// `None` when either side is empty or nothing overlaps at all.
pub fn partial_ratio_alignment(a: &str, b: &str) -> Option<Alignment> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let alignment = if a.len() > b.len() {
        let (score, _) = best_window(&b, &a);
        Alignment {
            score,
            dest_start: 0,
            dest_end: b.len(),
        }
    } else {
        let (score, window) = best_window(&a, &b);
        Alignment {
            score,
            dest_start: window.0,
            dest_end: window.1,
        }
    };

    (alignment.score > 0.0).then_some(alignment)
}

/// Slides `short` across `long`, including windows hanging off either edge.
///
/// Returns the best score and its window in `long`; the first window wins ties.
fn best_window(short: &[char], long: &[char]) -> (f64, (usize, usize)) {
    let m = short.len();
    let n = long.len();
    let needle: String = short.iter().collect();

    let prefixes = (1..m).map(|k| (0, k));
    let full = (0..=n - m).map(|i| (i, i + m));
    let suffixes = (1..m).rev().map(|k| (n - k, n));

    let mut best = (0.0, (0, m));
    for (start, end) in prefixes.chain(full).chain(suffixes) {
        let window: String = long[start..end].iter().collect();
        let score = ratio(&needle, &window);
        if score > best.0 {
            best = (score, (start, end));
            if score >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Lowercases per character without changing the character count, so
/// offsets found in the folded text apply to the original.
pub fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Converts a character offset into a byte offset within `text`.
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("summary", "summary", 100.0)]
    #[case("abc", "xyz", 0.0)]
    #[case("", "", 100.0)]
    fn ratio_scores(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!((ratio(a, b) - expected).abs() < 1e-9);
    }

    #[test]
    fn ratio_of_near_miss_is_high() {
        let score = ratio("assessment", "assesment");
        assert!(score > 85.0 && score < 100.0, "{score}");
    }

    #[test]
    fn partial_ratio_finds_contained_text() {
        assert_eq!(partial_ratio("summary", "patient summary: stable condition"), 100.0);
    }

    #[test]
    fn alignment_reports_char_offsets() {
        let alignment = partial_ratio_alignment("summary", "patient summary: stable").unwrap();
        assert_eq!((alignment.dest_start, alignment.dest_end), (8, 15));
        assert_eq!(alignment.score, 100.0);
    }

    #[test]
    fn alignment_counts_chars_not_bytes() {
        let alignment = partial_ratio_alignment("plan", "élan — plan").unwrap();
        assert_eq!((alignment.dest_start, alignment.dest_end), (7, 11));
    }

    #[test]
    fn longer_needle_aligns_to_whole_haystack() {
        let alignment = partial_ratio_alignment("patient summary", "summary").unwrap();
        assert_eq!((alignment.dest_start, alignment.dest_end), (0, 7));
        assert_eq!(alignment.score, 100.0);
    }

    #[test]
    fn edge_windows_are_considered() {
        let alignment = partial_ratio_alignment("history", "past histor").unwrap();
        assert_eq!(alignment.dest_end, 11);
        assert!(alignment.score > 80.0);
    }

    #[rstest]
    #[case("", "text")]
    #[case("text", "")]
    #[case("abc", "xyz")]
    fn no_alignment(#[case] a: &str, #[case] b: &str) {
        assert_eq!(partial_ratio_alignment(a, b), None);
        assert_eq!(partial_ratio(a, b), 0.0);
    }

    #[test]
    fn fold_case_keeps_char_count() {
        let text = "İstanbul PLAN";
        assert_eq!(fold_case(text).chars().count(), text.chars().count());
        assert_eq!(fold_case("PLAN"), "plan");
    }

    #[test]
    fn char_offsets_map_to_bytes() {
        let text = "é plan";
        assert_eq!(char_to_byte(text, 2), 3);
        assert_eq!(char_to_byte(text, 6), text.len());
    }
}
