use super::{
    clean_analyte_name, detect_category, extract_code, extract_range_text, is_number_token,
    is_table_header, looks_like_unit, LabParser,
};
use crate::pipeline::types::RawAnalyte;

pub struct Synevo;

impl LabParser for Synevo {
    fn key(&self) -> &'static str {
        "synevo"
    }

    fn display_name(&self) -> &'static str {
        "Synevo"
    }

    fn description(&self) -> &'static str {
        "Tabel cu denumirea înaintea rezultatului, valorile în afara intervalului marcate cu asterisc la începutul rândului"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["SYNEVO", "Synevo", "synevo.ro"]
    }

    /// Rows are whitespace-separated columns: name tokens, then the first
    /// numeric token as the result, then unit and reference interval. A `*`
    /// at the start of the row marks the result as outside the interval.
    fn parse(&self, text: &str) -> Vec<RawAnalyte> {
        let mut records = Vec::new();
        let mut category: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.chars().count() < 10 {
                if let Some(banner) = detect_category(line) {
                    category = Some(banner);
                }
                continue;
            }
            if let Some(banner) = detect_category(line) {
                category = Some(banner);
                continue;
            }
            if is_table_header(line) {
                continue;
            }

            let mut flagged = false;
            let mut body = line;
            if let Some(rest) = body.strip_prefix('*') {
                flagged = true;
                body = rest.trim_start();
            } else if let Some(rest) = body.strip_prefix("23 ") {
                // Print artifact standing in for the abnormal marker. Only
                // strip it when a name follows, not another number.
                let rest = rest.trim_start();
                if rest.chars().next().is_some_and(|c| !c.is_ascii_digit()) {
                    flagged = true;
                    body = rest;
                }
            }

            let tokens: Vec<&str> = body.split_whitespace().collect();
            let Some(value_idx) = tokens.iter().position(|t| is_number_token(t)) else {
                continue;
            };
            if value_idx == 0 {
                continue;
            }
            let prefix = tokens[..value_idx].join(" ");
            // Metadata labels ("Data recoltarii: ...") carry colons, names
            // never do.
            if prefix.contains(':') {
                continue;
            }
            let name = clean_analyte_name(&prefix);
            if name.chars().count() <= 3 {
                continue;
            }

            let value = tokens[value_idx].trim_end_matches('*');
            if tokens[value_idx].ends_with('*') {
                flagged = true;
            }

            let rest = &tokens[value_idx + 1..];
            let unit = rest
                .first()
                .filter(|t| looks_like_unit(t))
                .map(|t| (*t).to_string());
            let range_source = if unit.is_some() { &rest[1..] } else { rest };
            let range = extract_range_text(&range_source.join(" "));

            let mut record = RawAnalyte::new(name.clone(), value.to_string());
            record.category = category.clone();
            record.code = extract_code(&name);
            record.unit = unit;
            record.range = range;
            record.flagged_abnormal = flagged;
            records.push(record);
        }
        records
    }
}
