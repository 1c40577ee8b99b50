use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_known_unit,
    is_table_header, LabParser,
};
use crate::pipeline::types::RawAnalyte;

/// First standalone numeric token in a row, with its position.
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([<>]?\d+(?:[.,]\d+)*\*?)(?:\s|$)").unwrap()
});

pub struct MedLife;

impl LabParser for MedLife {
    fn key(&self) -> &'static str {
        "medlife"
    }

    fn display_name(&self) -> &'static str {
        "MedLife"
    }

    fn description(&self) -> &'static str {
        "Tabel cu rezultatul după denumire, unitățile dintr-un tabel fix de unități de măsură"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["MedLife", "MEDLIFE", "medlife.ro"]
    }

    /// A row is the analyte name followed by the first numeric token as the
    /// result. The number must sit past column five, the name must be longer
    /// than three characters and not digit-led. Metadata labels carry colons
    /// in the prefix and are skipped.
    fn parse(&self, text: &str) -> Vec<RawAnalyte> {
        let mut records = Vec::new();
        let mut category: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(banner) = detect_category(line) {
                category = Some(banner);
                continue;
            }
            if is_table_header(line) {
                continue;
            }
            let Some(cap) = FIRST_NUMBER.captures(line) else {
                continue;
            };
            let Some(value) = cap.get(1) else {
                continue;
            };
            let prefix = &line[..value.start()];
            if prefix.chars().count() <= 5 || prefix.contains(':') {
                continue;
            }
            let name = clean_analyte_name(prefix);
            if name.chars().count() <= 3
                || name.chars().next().is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }

            let rest: Vec<&str> = line[value.end()..].split_whitespace().collect();
            let unit = rest
                .first()
                .filter(|t| is_known_unit(t))
                .map(|t| (*t).to_string());
            let range_source = if unit.is_some() { &rest[1..] } else { &rest[..] };
            let range = extract_range_text(&range_source.join(" "));

            let mut record = RawAnalyte::new(name.clone(), value.as_str().to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = unit;
            record.range = range;
            records.push(record);
        }
        records
    }
}
