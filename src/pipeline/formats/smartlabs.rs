use std::sync::LazyLock;

use regex::Regex;

use super::{detect_category, extract_range_text, LabParser};
use crate::pipeline::types::RawAnalyte;

/// Block opener: the analyte code in parentheses, then the name.
static CODE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((?P<code>[A-Z][A-Z0-9]{1,9})\)\s+(?P<name>\S.*)$").unwrap()
});

/// Result line under the opener: the value, optionally followed by a unit.
static VALUE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<value>[<>]?\d+(?:[.,]\d+)*\*?)\s*(?P<unit>[A-Za-z0-9µ%][A-Za-z0-9µ%/^.²³]*)?$",
    )
    .unwrap()
});

pub struct SmartLabs;

impl LabParser for SmartLabs {
    fn key(&self) -> &'static str {
        "smartlabs"
    }

    fn display_name(&self) -> &'static str {
        "SmartLabs"
    }

    fn description(&self) -> &'static str {
        "Codul analizei în paranteze înaintea denumirii, rezultatul și unitatea pe rândul următor"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["SmartLabs", "SMARTLABS", "erpos"]
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
            let Some(head) = CODE_FIRST.captures(line) else {
                continue;
            };
            let Some(result) = lines.get(idx + 1).and_then(|l| VALUE_UNIT.captures(l))
            else {
                continue;
            };
            let range = lines
                .get(idx + 2)
                .filter(|l| !CODE_FIRST.is_match(l))
                .and_then(|l| extract_range_text(l));

            let raw_value = &result["value"];
            let mut record = RawAnalyte::new(
                format!("{} ({})", head["name"].trim(), &head["code"]),
                raw_value.trim_end_matches('*').to_string(),
            );
            record.category = category.clone();
            record.code = Some(head["code"].to_string());
            record.unit = result.name("unit").map(|m| m.as_str().to_string());
            record.range = range;
            record.flagged_abnormal = raw_value.ends_with('*');
            records.push(record);
        }
        records
    }
}
