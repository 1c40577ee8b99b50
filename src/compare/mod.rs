pub mod matcher;
pub mod report;
pub mod trend;

pub use matcher::{match_records, MatchedPair};
pub use report::build_report;
pub use trend::{classify, Classification, TOLERANCE_PERCENT};

use tracing::info;

use crate::models::{AnalyteGroup, ComparisonReport};

/// Align two visits' analytes and classify every change. Pure computation,
/// no error path.
pub fn compare_groups(earlier: &AnalyteGroup, later: &AnalyteGroup) -> ComparisonReport {
    info!(
        earlier = earlier.document_name.as_str(),
        later = later.document_name.as_str(),
        "Comparing lab reports"
    );
    let result = build_report(earlier, later);
    info!(entries = result.entries.len(), "Comparison assembled");
    result
}
