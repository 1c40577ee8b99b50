use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_number_token,
    is_table_header, looks_like_unit, LabParser,
};
use crate::pipeline::types::RawAnalyte;

/// Row index column: "1", "12.", "3)".
static ROW_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]?$").unwrap());

pub struct ProMed;

impl LabParser for ProMed {
    fn key(&self) -> &'static str {
        "promed"
    }

    fn display_name(&self) -> &'static str {
        "ProMed"
    }

    fn description(&self) -> &'static str {
        "Tabel numerotat: numărul curent, denumirea, rezultatul, unitatea și intervalul pe fiecare rând"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["PROMED", "ProMed", "policlinicapromed"]
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
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 || !ROW_INDEX.is_match(tokens[0]) {
                continue;
            }
            let Some(value_offset) = tokens[1..].iter().position(|t| is_number_token(t))
            else {
                continue;
            };
            let value_idx = value_offset + 1;
            if value_idx == 1 {
                continue;
            }
            let name = clean_analyte_name(&tokens[1..value_idx].join(" "));
            if name.chars().count() < 2
                || name.chars().next().is_some_and(|c| !c.is_alphabetic())
            {
                continue;
            }

            let raw_value = tokens[value_idx];
            let rest = &tokens[value_idx + 1..];
            let unit = rest
                .first()
                .filter(|t| looks_like_unit(t))
                .map(|t| (*t).to_string());
            let range_source = if unit.is_some() { &rest[1..] } else { rest };
            let range = extract_range_text(&range_source.join(" "));

            let mut record =
                RawAnalyte::new(name.clone(), raw_value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = unit;
            record.range = range;
            record.flagged_abnormal = raw_value.ends_with('*');
            records.push(record);
        }
        records
    }
}
