use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_number_token,
    is_table_header, looks_like_unit, LabParser,
};
use crate::pipeline::types::RawAnalyte;

pub struct Sanador;

impl LabParser for Sanador {
    fn key(&self) -> &'static str {
        "sanador"
    }

    fn display_name(&self) -> &'static str {
        "Sanador"
    }

    fn description(&self) -> &'static str {
        "Tabel pe patru coloane cu interval de referință obligatoriu, rezultatele în afara intervalului marcate cu asterisc"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["SANADOR", "Sanador", "sanador.ro"]
    }

    /// Rows carry all four columns; a row without a readable reference
    /// interval is layout noise, not a result.
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
            let Some(value_idx) = tokens.iter().position(|t| is_number_token(t)) else {
                continue;
            };
            if value_idx == 0 {
                continue;
            }
            let name = clean_analyte_name(&tokens[..value_idx].join(" "));
            if name.chars().count() <= 3 {
                continue;
            }

            let raw_value = tokens[value_idx];
            let rest = &tokens[value_idx + 1..];
            let unit = rest
                .first()
                .filter(|t| looks_like_unit(t))
                .map(|t| (*t).to_string());
            let range_source = if unit.is_some() { &rest[1..] } else { rest };
            let Some(range) = extract_range_text(&range_source.join(" ")) else {
                continue;
            };

            let mut record =
                RawAnalyte::new(name.clone(), raw_value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = unit;
            record.range = Some(range);
            record.flagged_abnormal = raw_value.ends_with('*');
            records.push(record);
        }
        records
    }
}
