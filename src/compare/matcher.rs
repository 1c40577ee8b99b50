use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::AnalyteRecord;

/// One aligned pair. Either side may be absent, never both.
pub struct MatchedPair<'a> {
    pub earlier: Option<&'a AnalyteRecord>,
    pub later: Option<&'a AnalyteRecord>,
}

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*").unwrap());
static KEYWORD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z0-9]{2,10})\)").unwrap());

/// Align two record sets. Earlier records are walked in order; each later
/// record can be claimed at most once, first match wins, no backtracking.
/// Unmatched records on either side come back as one-sided pairs.
pub fn match_records<'a>(
    earlier: &'a [AnalyteRecord],
    later: &'a [AnalyteRecord],
) -> Vec<MatchedPair<'a>> {
    let mut pairs = Vec::with_capacity(earlier.len() + later.len());
    let mut consumed: HashSet<Uuid> = HashSet::new();

    for record in earlier {
        let found = find_matching(record, later, &consumed);
        if let Some(found) = found {
            consumed.insert(found.id);
        }
        pairs.push(MatchedPair {
            earlier: Some(record),
            later: found,
        });
    }
    for record in later {
        if !consumed.contains(&record.id) {
            pairs.push(MatchedPair {
                earlier: None,
                later: Some(record),
            });
        }
    }
    pairs
}

/// Exact normalized-name equality first, keyword containment second.
fn find_matching<'a>(
    record: &AnalyteRecord,
    candidates: &'a [AnalyteRecord],
    consumed: &HashSet<Uuid>,
) -> Option<&'a AnalyteRecord> {
    let target = normalize_name(&record.name);
    if let Some(exact) = candidates
        .iter()
        .find(|c| !consumed.contains(&c.id) && normalize_name(&c.name) == target)
    {
        return Some(exact);
    }

    for keyword in extract_keywords(&record.name) {
        let keyword = keyword.to_lowercase();
        if let Some(fuzzy) = candidates
            .iter()
            .find(|c| !consumed.contains(&c.id) && c.name.to_lowercase().contains(&keyword))
        {
            return Some(fuzzy);
        }
    }
    None
}

/// Lowercased name with parenthetical fragments removed and whitespace
/// collapsed, the shared identity key for exact matching.
pub fn normalize_name(name: &str) -> String {
    let stripped = PARENTHETICAL.replace_all(name, " ");
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fuzzy-match keywords: the parenthetical code plus the first word longer
/// than three characters. Deliberately loose, the way clinicians abbreviate.
fn extract_keywords(name: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    if let Some(cap) = KEYWORD_CODE.captures(name) {
        keywords.push(cap[1].to_string());
    }
    if let Some(word) = name
        .split_whitespace()
        .find(|w| w.chars().count() > 3 && !w.starts_with('('))
    {
        keywords.push(word.to_string());
    }
    keywords
}
