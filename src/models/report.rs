use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analyte::AnalyteRecord;
use super::enums::AbnormalDirection;

/// Outcome of parsing one laboratory report document.
///
/// Built once per parse and never mutated afterward. `error` is present iff
/// `success` is false; a failed parse always carries an empty analyte list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    pub error: Option<String>,
    pub analytes: Vec<AnalyteRecord>,
    pub collection_date: Option<NaiveDate>,
    pub laboratory: Option<String>,
    pub report_number: Option<String>,
    pub patient_name: Option<String>,
    pub patient_cnp: Option<String>,
    pub total_count: usize,
    pub abnormal_count: usize,
    /// Non-fatal anomalies noticed during parsing.
    pub warnings: Vec<String>,
    /// Key of the strategy that produced the analytes.
    pub parser_used: Option<String>,
}

impl ParseResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            analytes: Vec::new(),
            collection_date: None,
            laboratory: None,
            report_number: None,
            patient_name: None,
            patient_cnp: None,
            total_count: 0,
            abnormal_count: 0,
            warnings: Vec::new(),
            parser_used: None,
        }
    }

    /// Flatten document-level metadata into one importable row per analyte,
    /// the shape downstream persistence consumes.
    pub fn import_records(&self) -> Vec<ImportRecord> {
        self.analytes
            .iter()
            .map(|a| ImportRecord {
                name: a.name.clone(),
                code: a.code.clone(),
                category: a.category.clone(),
                raw_value: a.value_text.clone(),
                numeric_value: a.value,
                unit: a.unit.clone(),
                range_min: a.reference_range_low,
                range_max: a.reference_range_high,
                range_text: a.reference_range_text.clone(),
                is_abnormal: a.abnormal,
                abnormal_direction: a.abnormal_direction,
                collection_date: a.collection_date.or(self.collection_date),
                laboratory: a.laboratory.clone().or_else(|| self.laboratory.clone()),
                report_number: self.report_number.clone(),
            })
            .collect()
    }
}

/// One analyte flattened with its document metadata, ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub name: String,
    pub code: Option<String>,
    pub category: Option<String>,
    pub raw_value: String,
    pub numeric_value: Option<f64>,
    pub unit: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub range_text: Option<String>,
    pub is_abnormal: bool,
    pub abnormal_direction: AbnormalDirection,
    pub collection_date: Option<NaiveDate>,
    pub laboratory: Option<String>,
    pub report_number: Option<String>,
}
