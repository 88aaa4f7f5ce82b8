//! Country matching for the autocomplete list and the picker grid.
//!
//! Both modes are pure functions over a record slice: no I/O, same inputs give
//! the same output.

use crate::country::CountryRecord;
use serde::Serialize;

/// Number of suggestions the autocomplete list shows
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Match quality. Variants are ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MatchRank {
    /// Name starts with the query
    Prefix,
    /// Name contains the query somewhere after its first character
    Substring,
}

/// A record matched by [`rank_matches`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub record: CountryRecord,
    pub rank: MatchRank,
}

impl MatchResult {
    /// Splits the record name around the first case-insensitive occurrence of
    /// `query`, as `(before, matched, after)`, for bold rendering.
    ///
    /// Returns `None` when the query does not occur in the name.
    pub fn highlight<'a>(&'a self, query: &str) -> Option<(&'a str, &'a str, &'a str)> {
        highlight(&self.record.name, query)
    }
}

/// Ranked autocomplete matching.
///
/// Names starting with the query come first, then names containing it
/// elsewhere. Each tier keeps the input order. The result is cut to `limit`
/// after ranking. A blank query yields no results.
pub fn rank_matches(query: &str, records: &[CountryRecord], limit: usize) -> Vec<MatchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut prefix = Vec::new();
    let mut substring = Vec::new();

    for record in records {
        let name = record.name.to_lowercase();
        if name.starts_with(&needle) {
            prefix.push(record);
        } else if name.contains(&needle) {
            substring.push(record);
        }
    }

    prefix
        .into_iter()
        .map(|r| (r, MatchRank::Prefix))
        .chain(substring.into_iter().map(|r| (r, MatchRank::Substring)))
        .take(limit)
        .map(|(record, rank)| MatchResult {
            record: record.clone(),
            rank,
        })
        .collect()
}

/// Picker matching: name or region contains the query, no ranking, no limit.
///
/// A blank query returns every record so the picker can show the full grid.
pub fn full_text_matches<'a>(query: &str, records: &'a [CountryRecord]) -> Vec<&'a CountryRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r
                    .region
                    .as_deref()
                    .is_some_and(|region| region.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Alphabetical copy of `records`, the order the picker grid uses
pub fn sorted_by_name(records: &[CountryRecord]) -> Vec<CountryRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_cached_key(|r| r.name.to_lowercase());
    sorted
}

fn highlight<'a>(name: &'a str, query: &str) -> Option<(&'a str, &'a str, &'a str)> {
    let needle: Vec<char> = query.trim().chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in name.char_indices() {
        if let Some(len) = folded_prefix_len(&name[start..], &needle) {
            let end = start + len;
            return Some((&name[..start], &name[start..end], &name[end..]));
        }
    }
    None
}

/// Byte length of the shortest prefix of `haystack` whose lowercase form
/// equals `needle`, if any.
fn folded_prefix_len(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, c) in haystack.char_indices() {
        for lower in c.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(offset + c.len_utf8());
        }
    }
    None
}
