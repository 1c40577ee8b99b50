use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_number_token,
    LabParser,
};
use crate::pipeline::types::RawAnalyte;

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>.{3,}?)\s+(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-z0-9µ%/^.²³]*)?$",
    )
    .unwrap()
});

/// Reference interval printed under the result row as "V.N.: 12 - 16" or
/// "Valori normale: ...".
static VN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:v\.?\s*n\.?|valori\s+normale)\s*:?\s*(?P<range>.+)$").unwrap()
});

pub struct Gral;

impl LabParser for Gral {
    fn key(&self) -> &'static str {
        "gral"
    }

    fn display_name(&self) -> &'static str {
        "Gral Medical"
    }

    fn description(&self) -> &'static str {
        "Rezultatul pe un rând, valorile normale pe rândul imediat următor introduse prin V.N."
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["Gral Medical", "GRAL", "gfrg.ro"]
    }

    fn parse(&self, text: &str) -> Vec<RawAnalyte> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut records = Vec::new();
        let mut category: Option<String> = None;

        for (idx, line) in lines.iter().enumerate() {
            if let Some(banner) = detect_category(line) {
                category = Some(banner);
                continue;
            }
            if VN_LINE.is_match(line) {
                continue;
            }
            let Some(cap) = ROW.captures(line) else {
                continue;
            };
            // Metadata labels carry colons, analyte names never do.
            if cap["name"].contains(':') {
                continue;
            }
            let name = clean_analyte_name(&cap["name"]);
            if name.chars().count() < 3
                || name.chars().next().is_some_and(|c| !c.is_alphabetic())
                || name.split_whitespace().any(is_number_token)
            {
                continue;
            }
            let range = lines
                .get(idx + 1)
                .and_then(|l| VN_LINE.captures(l))
                .map(|vn| {
                    let raw = vn["range"].trim().to_string();
                    extract_range_text(&raw).unwrap_or(raw)
                });

            let raw_value = &cap["value"];
            let mut record =
                RawAnalyte::new(name.clone(), raw_value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = cap
                .name("unit")
                .map(|m| m.as_str())
                .filter(|u| !is_number_token(u))
                .map(str::to_string);
            record.range = range;
            record.flagged_abnormal = raw_value.ends_with('*');
            records.push(record);
        }
        records
    }
}
