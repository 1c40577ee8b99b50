use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AbnormalDirection;

/// One measured laboratory parameter extracted from one report document.
///
/// A record is immutable once the pipeline produces it: it belongs to exactly
/// one source document and one collection date. The value has two mutually
/// exclusive representations: `value` when the printed result was numeric,
/// otherwise `value_text` alone carries a qualitative result ("Pozitiv",
/// "Rare", ...). When both reference bounds are known, `abnormal` always
/// equals `value < reference_range_low || value > reference_range_high`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyteRecord {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub value_text: String,
    pub unit: Option<String>,
    pub reference_range_text: Option<String>,
    pub reference_range_low: Option<f64>,
    pub reference_range_high: Option<f64>,
    /// Set only when the printed range is non-numeric (e.g. "Negativ").
    pub qualitative_range: Option<String>,
    pub abnormal: bool,
    pub abnormal_direction: AbnormalDirection,
    pub collection_date: Option<NaiveDate>,
    pub laboratory: Option<String>,
    pub source_document: String,
}

impl AnalyteRecord {
    /// True when the printed result could not be interpreted numerically.
    pub fn is_qualitative(&self) -> bool {
        self.value.is_none()
    }

    pub fn has_known_bounds(&self) -> bool {
        self.reference_range_low.is_some() || self.reference_range_high.is_some()
    }
}
