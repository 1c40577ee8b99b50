use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use super::types::RawAnalyte;
use crate::models::{AbnormalDirection, AnalyteRecord};

/// Document-level fields stamped onto every record produced from one report.
pub struct DocumentContext<'a> {
    pub collection_date: Option<NaiveDate>,
    pub laboratory: Option<&'a str>,
    pub source_document: &'a str,
}

static RANGE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)*)\s*[-–]\s*(\d+(?:[.,]\d+)*)").unwrap()
});
static RANGE_UPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?\s*<\s*=?\s*(\d+(?:[.,]\d+)*)\s*[\])]?$").unwrap()
});
static RANGE_LOWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?\s*>\s*=?\s*(\d+(?:[.,]\d+)*)\s*[\])]?$").unwrap()
});

/// Turn one raw tuple into a finalized record. Malformed fields degrade to
/// absent or qualitative; this function never fails.
pub fn normalize_record(raw: &RawAnalyte, ctx: &DocumentContext) -> AnalyteRecord {
    let value = parse_decimal(&raw.value);
    let (low, high, qualitative_range) = match raw.range.as_deref() {
        Some(text) => parse_range(text),
        None => (None, None, None),
    };

    let has_bounds = low.is_some() || high.is_some();
    let (abnormal, abnormal_direction) = match value {
        // Known bounds beat any printed marker.
        Some(v) if has_bounds => check_abnormal(v, low, high),
        _ => (raw.flagged_abnormal, AbnormalDirection::None),
    };

    AnalyteRecord {
        id: Uuid::new_v4(),
        name: raw.name.clone(),
        code: raw.code.clone(),
        category: raw.category.clone(),
        value,
        value_text: raw.value.clone(),
        unit: raw.unit.clone(),
        reference_range_text: raw.range.clone(),
        reference_range_low: low,
        reference_range_high: high,
        qualitative_range,
        abnormal,
        abnormal_direction,
        collection_date: ctx.collection_date,
        laboratory: ctx.laboratory.map(str::to_string),
        source_document: ctx.source_document.to_string(),
    }
}

/// Lenient decimal parsing for printed lab values: comparison operators and
/// the abnormal asterisk are display markers, multiple dots are thousand
/// separators, a comma is the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('*');
    let trimmed = trimmed.trim_start_matches(['<', '>', '=']).trim();
    if trimmed.is_empty() {
        return None;
    }
    let dots = trimmed.matches('.').count();
    let has_comma = trimmed.contains(',');
    let cleaned = if dots > 1 || (dots >= 1 && has_comma) {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.replace(',', ".")
    };
    cleaned.parse::<f64>().ok()
}

/// Read numeric bounds out of a printed reference range. Anything that fits
/// none of the numeric shapes comes back verbatim as a qualitative range.
pub fn parse_range(text: &str) -> (Option<f64>, Option<f64>, Option<String>) {
    if let Some(cap) = RANGE_PAIR.captures(text) {
        return (parse_decimal(&cap[1]), parse_decimal(&cap[2]), None);
    }
    let trimmed = text.trim();
    if let Some(cap) = RANGE_UPPER.captures(trimmed) {
        return (None, parse_decimal(&cap[1]), None);
    }
    if let Some(cap) = RANGE_LOWER.captures(trimmed) {
        return (parse_decimal(&cap[1]), None, None);
    }
    (None, None, Some(trimmed.to_string()))
}

/// Strictly outside the known bounds; a missing bound leaves that side open.
fn check_abnormal(value: f64, low: Option<f64>, high: Option<f64>) -> (bool, AbnormalDirection) {
    if low.is_some_and(|low| value < low) {
        return (true, AbnormalDirection::Below);
    }
    if high.is_some_and(|high| value > high) {
        return (true, AbnormalDirection::Above);
    }
    (false, AbnormalDirection::None)
}
