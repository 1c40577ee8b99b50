use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_analyte_name, detect_category, extract_code, is_number_token, is_table_header,
    LabParser,
};
use crate::pipeline::types::RawAnalyte;

/// `Name  value[/unit]  (range)`. Counts may use dot thousand separators
/// ("5.490.000"); the normalizer resolves those.
static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>.{3,}?)\s+(?P<value>[<>]?\d+(?:[.,]\d+)*)\s*/?\s*(?P<unit>[A-Za-z0-9µ%][A-Za-z0-9µ%/^.²³]*)?\s*(?:\((?P<range>[^)]+)\))?\s*$",
    )
    .unwrap()
});

pub struct Bioclinica;

impl LabParser for Bioclinica {
    fn key(&self) -> &'static str {
        "bioclinica"
    }

    fn display_name(&self) -> &'static str {
        "Bioclinica"
    }

    fn description(&self) -> &'static str {
        "Rezultat după denumire, opțional unitate după bara oblică, intervalul de referință între paranteze rotunde"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["Bioclinica", "BIOCLINICA", "bioclinica.ro"]
    }

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
            let Some(cap) = ROW.captures(line) else {
                continue;
            };
            // Metadata labels carry colons, analyte names never do.
            if cap["name"].contains(':') {
                continue;
            }
            let name = clean_analyte_name(&cap["name"]);
            if name.chars().count() < 3
                || name.chars().next().is_some_and(|c| c.is_ascii_digit())
                || name.split_whitespace().any(is_number_token)
            {
                continue;
            }
            let unit = cap
                .name("unit")
                .map(|m| m.as_str())
                .filter(|u| !is_number_token(u))
                .map(str::to_string);

            let mut record = RawAnalyte::new(name.clone(), cap["value"].to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = unit;
            record.range = cap.name("range").map(|m| m.as_str().trim().to_string());
            records.push(record);
        }
        records
    }
}
