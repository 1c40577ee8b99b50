//! Parsing and cross-visit comparison for Romanian laboratory reports.
//!
//! `pipeline` turns extracted report text into normalized analyte records;
//! `compare` aligns two visits' records and classifies every change. The
//! binary wraps both behind a small CLI.

pub mod compare;
pub mod models;
pub mod pipeline;

pub use compare::{compare_groups, TOLERANCE_PERCENT};
pub use models::{
    AbnormalDirection, AnalyteGroup, AnalyteRecord, ComparisonEntry, ComparisonReport,
    ParseResult, Trend,
};
pub use pipeline::{
    parse_file, parse_stream, parse_text, supported_laboratories, LabFormatInfo, ParseError,
};
