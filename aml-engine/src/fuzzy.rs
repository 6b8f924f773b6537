//! Token-sort-ratio string similarity and the standalone watchlist matcher.
//!
//! Sanctions screening needs token-sort-ratio semantics: both names are
//! lowercased, split on whitespace, their tokens sorted and rejoined, and the
//! result compared with a normalized edit distance. Reordered tokens
//! ("Enterprises Volkov" vs "Volkov Enterprises") score identically, which
//! plain Jaro-Winkler via `strsim` alone would not guarantee.

use std::collections::HashMap;

use crate::types::WatchlistEntry;

const TOP_MATCHES_PER_ENTITY: usize = 5;
const MIN_SCORE: u8 = 70;

fn normalize_and_sort(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ").to_lowercase()
}

/// Length of the longest common subsequence, used as a stand-in for a
/// SequenceMatcher-style matched-character count.
fn lcs_len(a: &[u8], b: &[u8]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Computes a 0-100 token-sort-ratio similarity between two names: both
/// names are lowercased, their whitespace-separated tokens sorted and
/// rejoined, then compared by a blend of matched-character overlap (LCS)
/// and normalized edit distance.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let sa = normalize_and_sort(a);
    let sb = normalize_and_sort(b);
    if sa.is_empty() || sb.is_empty() {
        return 0;
    }

    let lcs = lcs_len(sa.as_bytes(), sb.as_bytes());
    let overlap_ratio = (2.0 * lcs as f64) / (sa.len() + sb.len()) as f64;
    let edit_ratio = strsim::normalized_levenshtein(&sa, &sb);

    let blended = (overlap_ratio + edit_ratio) / 2.0;
    (blended * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Matches a set of observed entity names against a watchlist.
#[derive(Debug, Default)]
pub struct WatchlistMatcher;

impl WatchlistMatcher {
    /// Create a new matcher.
    pub fn new() -> Self {
        Self
    }

    /// Match `entities` against `watchlist`. `entity_indices` maps a
    /// lowercased entity name to the transaction indices it appears in, so
    /// callers can build one match-indices list per unique name.
    pub fn match_entities(
        &self,
        entities: &[(String, String)],
        watchlist: &[WatchlistEntry],
        entity_indices: &HashMap<String, Vec<usize>>,
    ) -> Vec<crate::types::WatchlistMatch> {
        let mut seen: std::collections::HashSet<(String, String)> = std::collections::HashSet::new();
        let mut matches = Vec::new();

        for (entity, field) in entities {
            let trimmed = entity.trim();
            if trimmed.is_empty() {
                continue;
            }
            let entity_lower = trimmed.to_lowercase();

            let mut scored: Vec<(u8, &WatchlistEntry)> = watchlist
                .iter()
                .map(|w| (token_sort_ratio(trimmed, &w.name), w))
                .filter(|(score, _)| *score >= MIN_SCORE)
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            scored.truncate(TOP_MATCHES_PER_ENTITY);

            for (score, entry) in scored {
                let wl_lower = entry.name.to_lowercase();
                let key = (entity_lower.clone(), wl_lower.clone());
                if !seen.insert(key) {
                    continue;
                }
                matches.push(crate::types::WatchlistMatch {
                    matched_entity: trimmed.to_string(),
                    watchlist_entry: entry.name.clone(),
                    match_score: score,
                    match_field: field.clone(),
                    transaction_indices: entity_indices
                        .get(&entity_lower)
                        .cloned()
                        .unwrap_or_default(),
                });
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_100() {
        assert_eq!(token_sort_ratio("Volkov Enterprises", "Volkov Enterprises"), 100);
    }

    #[test]
    fn reordered_tokens_score_100() {
        assert_eq!(token_sort_ratio("Enterprises Volkov", "Volkov Enterprises"), 100);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(token_sort_ratio("Clean Customer BV", "Volkov Enterprises") < 40);
    }

    #[test]
    fn empty_name_scores_zero() {
        assert_eq!(token_sort_ratio("", "Volkov"), 0);
    }
}
