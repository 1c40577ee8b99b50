use std::sync::LazyLock;

use regex::Regex;

use super::{detect_category, extract_range_text, is_number_token, looks_like_unit, LabParser};
use crate::pipeline::types::RawAnalyte;

/// Block opener: the analyte name with its parenthetical code, alone on a
/// line. Value, unit and range each get their own line below it.
static NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^\d(]{3,}?)\s*\((?P<code>[A-Z][A-Z0-9]{1,9})\)$").unwrap()
});

static RANGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*(?P<range>[^\]]+?)\s*\]$").unwrap());

/// How far below the name line the block's value/unit/range may sit.
const BLOCK_SPAN: usize = 5;

pub struct ClinicaSante;

impl LabParser for ClinicaSante {
    fn key(&self) -> &'static str {
        "clinica_sante"
    }

    fn display_name(&self) -> &'static str {
        "Clinica Sante"
    }

    fn description(&self) -> &'static str {
        "Aşezare verticală: denumirea cu codul analizei pe un rând, apoi intervalul, unitatea și rezultatul pe rânduri separate"
    }

    fn signatures(&self) -> &'static [&'static str] {
        &["Clinica Sante", "CLINICA SANTE", "analizeonline.ro"]
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
            let Some(cap) = NAME_LINE.captures(line) else {
                continue;
            };
            let name = format!("{} ({})", cap["name"].trim(), &cap["code"]);
            let code = cap["code"].to_string();

            let mut value: Option<&str> = None;
            let mut unit: Option<&str> = None;
            let mut range: Option<String> = None;
            for below in lines.iter().skip(idx + 1).take(BLOCK_SPAN) {
                if NAME_LINE.is_match(below) {
                    break;
                }
                if value.is_none() && is_number_token(below) {
                    value = Some(below);
                } else if range.is_none() {
                    if let Some(range_cap) = RANGE_LINE.captures(below) {
                        range = extract_range_text(&range_cap["range"]);
                        continue;
                    }
                    if unit.is_none() && looks_like_unit(below) {
                        unit = Some(below);
                    }
                } else if unit.is_none() && looks_like_unit(below) {
                    unit = Some(below);
                }
            }
            // Incomplete blocks are page noise, not results.
            let (Some(value), Some(range)) = (value, range) else {
                continue;
            };

            let flagged = value.ends_with('*');
            let mut record =
                RawAnalyte::new(name, value.trim_end_matches('*').to_string());
            record.category = category.clone();
            record.code = Some(code);
            record.unit = unit.map(str::to_string);
            record.range = Some(range);
            record.flagged_abnormal = flagged;
            records.push(record);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
CLINICA SANTE
Buletin analize

HEMATOLOGIE
Hemoglobina (HGB)
[ 12.0 - 16.0 ]
g/dL
13.5
Leucocite (WBC)
[ 4.0 - 10.0 ]
10^3/µL
11.2*

BIOCHIMIE
Glicemie (GLU)
[ 70 - 110 ]
mg/dL
95
";

    #[test]
    fn parses_vertical_blocks() {
        let records = ClinicaSante.parse(REPORT);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "Hemoglobina (HGB)");
        assert_eq!(records[0].code.as_deref(), Some("HGB"));
        assert_eq!(records[0].value, "13.5");
        assert_eq!(records[0].unit.as_deref(), Some("g/dL"));
        assert_eq!(records[0].range.as_deref(), Some("12.0 - 16.0"));
        assert_eq!(records[0].category.as_deref(), Some("HEMATOLOGIE"));

        assert_eq!(records[1].value, "11.2");
        assert!(records[1].flagged_abnormal);

        assert_eq!(records[2].category.as_deref(), Some("BIOCHIMIE"));
    }

    #[test]
    fn block_without_value_is_dropped() {
        let records = ClinicaSante.parse("Hemoglobina (HGB)\n[ 12.0 - 16.0 ]\ng/dL\n");
        assert!(records.is_empty());
    }

    #[test]
    fn block_without_range_is_dropped() {
        let records = ClinicaSante.parse("Hemoglobina (HGB)\ng/dL\n13.5\n");
        assert!(records.is_empty());
    }

    #[test]
    fn next_name_line_closes_the_block() {
        // The value below belongs to the second block only.
        let records = ClinicaSante.parse(
            "Hemoglobina (HGB)\nGlicemie (GLU)\n[ 70 - 110 ]\nmg/dL\n95\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Glicemie (GLU)");
    }
}
