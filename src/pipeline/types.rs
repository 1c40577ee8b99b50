use chrono::NaiveDate;

/// One candidate analyte tuple as tokenized by a format strategy, before
/// normalization. Values and ranges are kept exactly as printed; decimal
/// separators and comparison operators are the normalizer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnalyte {
    pub category: Option<String>,
    pub name: String,
    pub code: Option<String>,
    pub value: String,
    pub unit: Option<String>,
    pub range: Option<String>,
    /// Abnormal marker printed by the source layout (row flag, asterisk).
    /// Honored by the normalizer only when reference bounds are unknown.
    pub flagged_abnormal: bool,
}

impl RawAnalyte {
    /// Tuple with only name and raw value set.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: None,
            name: name.into(),
            code: None,
            value: value.into(),
            unit: None,
            range: None,
            flagged_abnormal: false,
        }
    }
}

/// Document-level fields scanned once per document, independent of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub collection_date: Option<NaiveDate>,
    pub report_number: Option<String>,
    pub patient_name: Option<String>,
    pub patient_cnp: Option<String>,
}
