use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analyte::AnalyteRecord;
use super::enums::Trend;

/// One visit's worth of analyte records, as fed to the comparison engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyteGroup {
    pub document_date: Option<NaiveDate>,
    pub document_name: String,
    pub analytes: Vec<AnalyteRecord>,
}

/// How one analyte changed between two visits.
///
/// Built from zero, one or two aligned records sharing a conceptual identity.
/// Display fields (name, category, unit, range text) prefer the later side
/// when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub reference_range_text: Option<String>,
    pub earlier_value: Option<String>,
    pub later_value: Option<String>,
    pub earlier_numeric: Option<f64>,
    pub later_numeric: Option<f64>,
    pub earlier_abnormal: bool,
    pub later_abnormal: bool,
    pub absolute_difference: Option<f64>,
    pub percentage_difference: Option<f64>,
    pub trend: Trend,
    pub message: String,
    pub earlier_date: Option<NaiveDate>,
    pub later_date: Option<NaiveDate>,
}

impl ComparisonEntry {
    /// Present only in the later visit: a new analyte with no baseline.
    pub fn is_new(&self) -> bool {
        self.earlier_value.is_none()
    }

    /// Present only in the earlier visit: no longer measured.
    pub fn is_discontinued(&self) -> bool {
        self.later_value.is_none()
    }
}

/// The two source-document descriptors plus the sorted comparison entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub earlier_date: Option<NaiveDate>,
    pub earlier_document_name: String,
    pub later_date: Option<NaiveDate>,
    pub later_document_name: String,
    pub entries: Vec<ComparisonEntry>,
}
