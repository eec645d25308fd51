//! Levenshtein distance and the similarity measure used by fuzzy queries.

use std::cmp::min;

/// Levenshtein distance: the minimum number of single-character
/// insertions, deletions or substitutions turning `s1` into `s2`.
fn distance_chars(s1: &[char], s2: &[char]) -> usize {
    let len2 = s2.len();
    if s1.is_empty() {
        return len2;
    }
    if len2 == 0 {
        return s1.len();
    }

    // Two rows are enough.
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for (i, &c1) in s1.iter().enumerate() {
        curr_row[0] = i + 1;
        for j in 1..=len2 {
            let cost = usize::from(c1 != s2[j - 1]);
            curr_row[j] = min(
                min(prev_row[j] + 1, curr_row[j - 1] + 1),
                prev_row[j - 1] + cost,
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Similarity between a query term and a dictionary term.
///
/// `similarity = 1 - distance / (prefix_length + min(|query suffix|, |term suffix|))`,
/// where both strings are compared after the shared `prefix_length` characters.
/// A term that does not start with the query's prefix has similarity 0.
pub fn fuzzy_similarity(query: &str, term: &str, prefix_length: usize) -> f32 {
    let query_chars: Vec<char> = query.chars().collect();
    let term_chars: Vec<char> = term.chars().collect();
    let prefix_length = min(prefix_length, query_chars.len());

    if term_chars.len() < prefix_length || query_chars[..prefix_length] != term_chars[..prefix_length]
    {
        return 0.0;
    }

    let query_rest = &query_chars[prefix_length..];
    let term_rest = &term_chars[prefix_length..];
    let shorter = min(query_rest.len(), term_rest.len());

    if shorter == 0 {
        // Only the prefix is left on one side: similar only when both are exhausted.
        return if query_rest.len() == term_rest.len() {
            1.0
        } else if prefix_length == 0 {
            0.0
        } else {
            1.0 - query_rest.len().max(term_rest.len()) as f32 / prefix_length as f32
        };
    }

    let distance = distance_chars(query_rest, term_rest);
    1.0 - distance as f32 / (prefix_length + shorter) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(s1: &str, s2: &str) -> usize {
        let s1: Vec<char> = s1.chars().collect();
        let s2: Vec<char> = s2.chars().collect();
        distance_chars(&s1, &s2)
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("wuzza", "wuzzy"), 1);
        assert_eq!(distance("wuzza", "fuzzy"), 2);
    }

    #[test]
    fn test_fuzzy_similarity() {
        assert!((fuzzy_similarity("wuzza", "wuzzy", 0) - 0.8).abs() < 1e-6);
        assert!((fuzzy_similarity("wuzza", "fuzzy", 0) - 0.6).abs() < 1e-6);
        assert_eq!(fuzzy_similarity("lucene", "lucene", 0), 1.0);
        assert_eq!(fuzzy_similarity("lucene", "jucene", 2), 0.0);
        assert!(fuzzy_similarity("lucene", "lucent", 2) > 0.7);
    }
}
