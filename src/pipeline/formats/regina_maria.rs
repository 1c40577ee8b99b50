use std::sync::LazyLock;

use regex::Regex;

use super::{clean_analyte_name, detect_category, extract_code, LabParser};
use crate::pipeline::types::RawAnalyte;

/// Rows print an equals sign between name and value:
/// `Hemoglobina = 13.5 g/dL [12.0 - 16.0]`.
static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[^=\[\]]{3,}?)\s*=\s*(?P<value>[<>]?\d+(?:[.,]\d+)*)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-zµ%/^.²³0-9]*)?\s*(?:\[(?P<range>[^\]]+)\])?\s*$",
    )
    .unwrap()
});

pub struct ReginaMaria;

impl LabParser for ReginaMaria {
    fn key(&self) -> &'static str {
        "regina_maria"
    }

    fn display_name(&self) -> &'static str {
        "Regina Maria"
    }

    fn description(&self) -> &'static str {
        "Rânduri cu semnul egal între denumire și rezultat, intervalul de referință între paranteze drepte"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["REGINA MARIA", "Regina Maria", "reginamaria.ro"]
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
            let Some(cap) = ROW.captures(line) else {
                continue;
            };
            let name = clean_analyte_name(&cap["name"]);
            if name.len() < 3 || name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }
            let mut record = RawAnalyte::new(name.clone(), cap["value"].to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = cap.name("unit").map(|m| m.as_str().to_string());
            record.range = cap.name("range").map(|m| m.as_str().trim().to_string());
            records.push(record);
        }
        records
    }
}
