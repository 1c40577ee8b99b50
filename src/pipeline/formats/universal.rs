use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_number_token,
    looks_like_unit, LabParser,
};
use crate::pipeline::types::RawAnalyte;

/// Header and footer vocabulary of Romanian lab bulletins. Only short lines
/// are screened; a long line with one of these words may still be a result.
const SKIP_KEYWORDS: &[&str] = &[
    "pagina", "page", "data:", "ora:", "validat", "semnat", "laborator", "adresa:",
    "telefon:", "fax:", "email:", "www.", "http", ".ro", ".com", "copyright", "rezultat",
    "unitate", "interval", "referinta", "referință", "valoare", "medic", "doctor",
    "asistent",
];

const SKIP_SCAN_WIDTH: usize = 80;

/// Columnar row: a two-space gap after the name, then value, unit, range.
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>\S.{1,48}?)\s{2,}(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s+(?P<unit>\S+)\s+(?P<range>\S.*)$",
    )
    .unwrap()
});

/// Equals row: `Name = value [unit] [[range]]`.
static EQUALS_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[^=\[\]]{3,}?)\s*=\s*(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-zµ%/^.²³0-9]*)?\s*(?:\[(?P<range>[^\]]+)\])?\s*$",
    )
    .unwrap()
});

/// Simplified row: name, value, optional unit, nothing else.
static SIMPLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>.{2,50}?)\s+(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-zµ%/^.²³0-9]*)?$",
    )
    .unwrap()
});

pub struct Universal;

impl LabParser for Universal {
    fn key(&self) -> &'static str {
        "universal"
    }

    fn display_name(&self) -> &'static str {
        "Universal"
    }

    fn description(&self) -> &'static str {
        "Format generic pentru laboratoare nerecunoscute, încearcă pe rând mai multe tipare de rând"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &[]
    }

    fn parse(&self, text: &str) -> Vec<RawAnalyte> {
        let mut records = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut category: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || should_skip(line) {
                continue;
            }
            if let Some(banner) = detect_category(line) {
                category = Some(banner);
                continue;
            }
            let Some(row) = match_row(line) else {
                continue;
            };
            let name = clean_analyte_name(row.name);
            if !acceptable_name(row.name, &name) {
                continue;
            }
            // Page-repeated rows collapse to one record.
            if !seen.insert((name.to_lowercase(), row.value.to_string())) {
                continue;
            }

            let mut record =
                RawAnalyte::new(name.clone(), row.value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = row.unit;
            record.range = row.range;
            record.flagged_abnormal = row.value.ends_with('*');
            records.push(record);
        }
        records
    }
}

struct RowParts<'a> {
    name: &'a str,
    value: &'a str,
    unit: Option<String>,
    range: Option<String>,
}

fn should_skip(line: &str) -> bool {
    if line.chars().count() >= SKIP_SCAN_WIDTH {
        return false;
    }
    let lower = line.to_lowercase();
    SKIP_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn acceptable_name(raw: &str, cleaned: &str) -> bool {
    !raw.contains(':')
        && cleaned.chars().count() >= 3
        && cleaned.chars().next().is_some_and(|c| c.is_alphabetic())
        && !cleaned.split_whitespace().any(is_number_token)
}

/// The three grammars in fixed order; the first that fits wins.
fn match_row(line: &str) -> Option<RowParts<'_>> {
    if let Some(cap) = TABLE_ROW.captures(line) {
        let unit_token = cap.name("unit")?.as_str();
        let range_raw = cap.name("range")?.as_str();
        let (unit, range_source) = if looks_like_unit(unit_token) {
            (Some(unit_token.to_string()), range_raw.to_string())
        } else {
            (None, format!("{unit_token} {range_raw}"))
        };
        return Some(RowParts {
            name: cap.name("name")?.as_str(),
            value: cap.name("value")?.as_str(),
            unit,
            range: extract_range_text(&range_source),
        });
    }
    if let Some(cap) = EQUALS_ROW.captures(line) {
        return Some(RowParts {
            name: cap.name("name")?.as_str(),
            value: cap.name("value")?.as_str(),
            unit: cap.name("unit").map(|m| m.as_str().to_string()),
            range: cap.name("range").map(|m| m.as_str().trim().to_string()),
        });
    }
    if let Some(cap) = SIMPLE_ROW.captures(line) {
        let unit = cap
            .name("unit")
            .map(|m| m.as_str())
            .filter(|u| !is_number_token(u))
            .map(str::to_string);
        return Some(RowParts {
            name: cap.name("name")?.as_str(),
            value: cap.name("value")?.as_str(),
            unit,
            range: None,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
LABORATOR NECUNOSCUT SRL
Pagina 1 din 1

HEMATOLOGIE
Hemoglobina   13.5   g/dL   12.0 - 16.0
Leucocite = 7.2 10^3/µL [4.0 - 10.0]
Hematocrit 41.2 %

BIOCHIMIE
Glicemie   95   mg/dL   70 - 110
";

    #[test]
    fn tries_table_equals_and_simple_grammars() {
        let records = Universal.parse(REPORT);
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].name, "Hemoglobina");
        assert_eq!(records[0].unit.as_deref(), Some("g/dL"));
        assert_eq!(records[0].range.as_deref(), Some("12.0 - 16.0"));
        assert_eq!(records[0].category.as_deref(), Some("HEMATOLOGIE"));

        assert_eq!(records[1].name, "Leucocite");
        assert_eq!(records[1].range.as_deref(), Some("4.0 - 10.0"));

        assert_eq!(records[2].name, "Hematocrit");
        assert_eq!(records[2].unit.as_deref(), Some("%"));
        assert_eq!(records[2].range, None);

        assert_eq!(records[3].category.as_deref(), Some("BIOCHIMIE"));
    }

    #[test]
    fn footer_and_contact_lines_are_skipped() {
        let records = Universal.parse(
            "Pagina 2 din 3\nwww.laborator-necunoscut.ro\nTelefon: 021 555 1234\nValidat de Dr. Pop",
        );
        assert!(records.is_empty());
    }

    #[test]
    fn repeated_page_header_rows_deduplicate() {
        let text = "Hemoglobina   13.5   g/dL   12.0 - 16.0\n\
                    Hemoglobina   13.5   g/dL   12.0 - 16.0";
        let records = Universal.parse(text);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn same_analyte_with_different_value_is_kept() {
        let text = "Hemoglobina   13.5   g/dL   12.0 - 16.0\n\
                    Hemoglobina   14.1   g/dL   12.0 - 16.0";
        let records = Universal.parse(text);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn metadata_labels_are_rejected_by_the_colon_guard() {
        let records = Universal.parse("Data recoltarii: 02.04.2024\nCod pacient: 445566");
        assert!(records.is_empty());
    }

    #[test]
    fn non_unit_third_column_folds_into_the_range() {
        let records = Universal.parse("Glicemie  95  70 - 110");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unit, None);
        assert_eq!(records[0].range.as_deref(), Some("70 - 110"));
    }
}
