//! Search-query filter suffix
//!
//! A search message may end in `"/filter chain=<id>,dex=<id>"`. The part
//! before the marker goes to the provider; the clauses narrow the result
//! list by exact match. Unrecognized keys are ignored, not rejected.

use super::types::TokenPair;

/// Marker token introducing the filter clause list
pub const FILTER_MARKER: &str = "/filter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub key: String,
    pub value: String,
}

/// A search text split into provider query and filter clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: Vec<FilterClause>,
}

/// Whether the text carries a filter suffix: the marker as a standalone
/// word, from the second word onward. A marker embedded inside another
/// word (an address, say) is just query text.
pub fn has_filter_suffix(text: &str) -> bool {
    text.split_whitespace().skip(1).any(|word| word == FILTER_MARKER)
}

/// Split a raw search message into the provider query and its filters
pub fn parse_query(raw: &str) -> SearchQuery {
    let (text, clause_text) = split_at_marker(raw);

    let filters = clause_text
        .split(',')
        .filter_map(|clause| {
            let (key, value) = clause.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(FilterClause {
                key: key.to_lowercase(),
                value: value.to_string(),
            })
        })
        .collect();

    SearchQuery {
        text: text.trim().to_string(),
        filters,
    }
}

/// Split at the first standalone occurrence of the marker word
fn split_at_marker(raw: &str) -> (&str, &str) {
    for (pos, _) in raw.match_indices(FILTER_MARKER) {
        let head = &raw[..pos];
        let tail = &raw[pos + FILTER_MARKER.len()..];
        let standalone = head.ends_with(char::is_whitespace)
            && !head.trim().is_empty()
            && (tail.is_empty() || tail.starts_with(char::is_whitespace));
        if standalone {
            return (head, tail);
        }
    }
    (raw, "")
}

/// Narrow a provider result list by exact match on the recognized keys
pub fn apply(filters: &[FilterClause], pairs: Vec<TokenPair>) -> Vec<TokenPair> {
    if filters.is_empty() {
        return pairs;
    }
    pairs
        .into_iter()
        .filter(|pair| filters.iter().all(|clause| matches(clause, pair)))
        .collect()
}

fn matches(clause: &FilterClause, pair: &TokenPair) -> bool {
    match clause.key.as_str() {
        "chain" => pair.chain_id == clause.value,
        "dex" => pair.dex_id == clause.value,
        // Unrecognized filter keys never exclude anything
        _ => true,
    }
}
