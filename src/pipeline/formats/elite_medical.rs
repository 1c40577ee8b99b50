use std::sync::LazyLock;

use regex::Regex;

use super::{clean_analyte_name, detect_category, extract_code, LabParser};
use crate::pipeline::types::RawAnalyte;

/// Result line: an equals sign leading the value, unit optional.
static EQ_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^=\s*(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-z0-9µ%/^.²³]*)?\s*$",
    )
    .unwrap()
});

static RANGE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(?P<range>[^\]]+?)\s*\]").unwrap());

/// How many lines below may hold the value line, and below that the range.
const LOOKAHEAD: usize = 3;

pub struct EliteMedical;

impl LabParser for EliteMedical {
    fn key(&self) -> &'static str {
        "elite_medical"
    }

    fn display_name(&self) -> &'static str {
        "Elite Medical"
    }

    fn description(&self) -> &'static str {
        "Denumirea cu codul analizei pe un rând, rezultatul introdus prin semnul egal pe rândurile următoare, intervalul între paranteze drepte"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["Elite Medical", "ELITE MEDICAL", "poliana.ro"]
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
            if line.contains('=') || line.contains('[') {
                continue;
            }
            let Some(code) = extract_code(line) else {
                continue;
            };
            let name = clean_analyte_name(line);

            let Some((value_idx, result)) = lines
                .iter()
                .enumerate()
                .skip(idx + 1)
                .take(LOOKAHEAD)
                .find_map(|(i, l)| EQ_VALUE.captures(l).map(|cap| (i, cap)))
            else {
                continue;
            };
            let range = lines
                .iter()
                .skip(value_idx + 1)
                .take(LOOKAHEAD)
                .find_map(|l| RANGE_BRACKET.captures(l))
                .map(|cap| cap["range"].to_string());

            let raw_value = &result["value"];
            let mut record =
                RawAnalyte::new(name, raw_value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = Some(code);
            record.unit = result.name("unit").map(|m| m.as_str().to_string());
            record.range = range;
            record.flagged_abnormal = raw_value.ends_with('*');
            records.push(record);
        }
        records
    }
}
