use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::types::DocumentMetadata;

/// Collection-date labels, most specific first. First match wins.
static COLLECTION_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)data\s+recolt[ăa]rii\s*:?\s*(\d{1,2}[./-]\d{1,2}[./-]\d{4})").unwrap(),
        Regex::new(r"(?i)recolt(?:are|at[ăa]?)\s*:?\s*(\d{1,2}[./-]\d{1,2}[./-]\d{4})").unwrap(),
        Regex::new(r"(\d{1,2}[./-]\d{1,2}[./-]\d{4})\s*[-–]?\s*(?i:recolt)").unwrap(),
    ]
});

static REPORT_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i:nr\.?\s*buletin\s*:?\s*)([A-Z0-9][A-Z0-9/-]*)").unwrap(),
        Regex::new(r"(?i:buletin\s+nr\.?\s*:?\s*)([A-Z0-9][A-Z0-9/-]*)").unwrap(),
        Regex::new(r"(?i:num[ăa]r\s+raport\s*:?\s*)([A-Z0-9][A-Z0-9/-]*)").unwrap(),
        Regex::new(r"(?i:cod\s+prob[ăa]\s*:?\s*)([A-Z0-9][A-Z0-9/-]*)").unwrap(),
        Regex::new(r"\bNr\.?\s*:?\s*(\d{5,12})\b").unwrap(),
    ]
});

/// Patient names are printed as capitalized words after a label; the capture
/// stays case-sensitive so it stops before following all-caps field labels
/// are misread as part of the name.
static PATIENT_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i:nume\s+[șs]i\s+prenume\s*:\s*)([\p{Lu}][\p{L}-]+(?:\s+[\p{Lu}][\p{L}-]+){0,3})").unwrap(),
        Regex::new(r"(?i:pacient[ăa]?\s*:\s*)([\p{Lu}][\p{L}-]+(?:\s+[\p{Lu}][\p{L}-]+){0,3})").unwrap(),
        Regex::new(r"(?i:nume\s*:\s*)([\p{Lu}][\p{L}-]+(?:\s+[\p{Lu}][\p{L}-]+){0,3})").unwrap(),
    ]
});

static CNP_LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:CNP\s*:?\s*)(\d{13})\b").unwrap());
static CNP_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{13})\b").unwrap());

/// Scan the full document text once for header-level metadata.
/// Every field is optional; absence is never an error.
pub fn extract_metadata(text: &str) -> DocumentMetadata {
    DocumentMetadata {
        collection_date: extract_collection_date(text),
        report_number: extract_report_number(text),
        patient_name: extract_patient_name(text),
        patient_cnp: extract_patient_cnp(text),
    }
}

pub fn extract_collection_date(text: &str) -> Option<NaiveDate> {
    COLLECTION_DATE_PATTERNS
        .iter()
        .find_map(|p| p.captures(text))
        .and_then(|cap| parse_date(&cap[1]))
}

pub fn extract_report_number(text: &str) -> Option<String> {
    REPORT_NUMBER_PATTERNS
        .iter()
        .find_map(|p| p.captures(text))
        .map(|cap| cap[1].to_string())
}

pub fn extract_patient_name(text: &str) -> Option<String> {
    let raw = PATIENT_NAME_PATTERNS
        .iter()
        .find_map(|p| p.captures(text))
        .map(|cap| cap[1].to_string())?;
    // Cut field labels the capitalized-word capture may have swallowed.
    let cleaned = raw
        .split_whitespace()
        .take_while(|w| !matches!(*w, "CNP" | "Cod" | "Data" | "Nr"))
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.chars().count() > 2 {
        Some(cleaned)
    } else {
        None
    }
}

pub fn extract_patient_cnp(text: &str) -> Option<String> {
    CNP_LABELED
        .captures(text)
        .or_else(|| CNP_BARE.captures(text))
        .map(|cap| cap[1].to_string())
}

/// Accepts dd.mm.yyyy with period, slash or hyphen separators.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.replace(['/', '-'], ".");
    NaiveDate::parse_from_str(&normalized, "%d.%m.%Y").ok()
}
