use super::matcher::{match_records, MatchedPair};
use super::trend::classify;
use crate::models::{AnalyteGroup, ComparisonEntry, ComparisonReport};

/// Align, classify and sort two visits' records into a comparison report.
pub fn build_report(earlier: &AnalyteGroup, later: &AnalyteGroup) -> ComparisonReport {
    let pairs = match_records(&earlier.analytes, &later.analytes);
    let mut entries: Vec<ComparisonEntry> = pairs
        .iter()
        .map(|pair| build_entry(pair, earlier, later))
        .collect();
    sort_entries(&mut entries);

    ComparisonReport {
        earlier_date: earlier.document_date,
        earlier_document_name: earlier.document_name.clone(),
        later_date: later.document_date,
        later_document_name: later.document_name.clone(),
        entries,
    }
}

fn build_entry(
    pair: &MatchedPair<'_>,
    earlier_group: &AnalyteGroup,
    later_group: &AnalyteGroup,
) -> ComparisonEntry {
    let classification = classify(pair.earlier, pair.later);

    ComparisonEntry {
        name: pair
            .later
            .or(pair.earlier)
            .map(|r| r.name.clone())
            .unwrap_or_default(),
        category: pair
            .later
            .and_then(|r| r.category.clone())
            .or_else(|| pair.earlier.and_then(|r| r.category.clone())),
        unit: pair
            .later
            .and_then(|r| r.unit.clone())
            .or_else(|| pair.earlier.and_then(|r| r.unit.clone())),
        reference_range_text: pair
            .later
            .and_then(|r| r.reference_range_text.clone())
            .or_else(|| pair.earlier.and_then(|r| r.reference_range_text.clone())),
        earlier_value: pair.earlier.map(|r| r.value_text.clone()),
        later_value: pair.later.map(|r| r.value_text.clone()),
        earlier_numeric: pair.earlier.and_then(|r| r.value),
        later_numeric: pair.later.and_then(|r| r.value),
        earlier_abnormal: pair.earlier.is_some_and(|r| r.abnormal),
        later_abnormal: pair.later.is_some_and(|r| r.abnormal),
        absolute_difference: classification.absolute_difference,
        percentage_difference: classification.percentage_difference,
        trend: classification.trend,
        message: classification.message,
        earlier_date: pair
            .earlier
            .and_then(|r| r.collection_date.or(earlier_group.document_date)),
        later_date: pair
            .later
            .and_then(|r| r.collection_date.or(later_group.document_date)),
    }
}

/// Category ascending with uncategorized entries last, then analyte name.
fn sort_entries(entries: &mut [ComparisonEntry]) {
    entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

fn sort_key(entry: &ComparisonEntry) -> (bool, Option<&str>, &str) {
    (
        entry.category.is_none(),
        entry.category.as_deref(),
        entry.name.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbnormalDirection, AnalyteRecord, Trend};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(name: &str, category: Option<&str>, value: f64) -> AnalyteRecord {
        AnalyteRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: None,
            category: category.map(str::to_string),
            value: Some(value),
            value_text: value.to_string(),
            unit: Some("mg/dL".to_string()),
            reference_range_text: Some("70 - 110".to_string()),
            reference_range_low: Some(70.0),
            reference_range_high: Some(110.0),
            qualitative_range: None,
            abnormal: value < 70.0 || value > 110.0,
            abnormal_direction: AbnormalDirection::None,
            collection_date: None,
            laboratory: None,
            source_document: "doc.pdf".to_string(),
        }
    }

    fn group(name: &str, date: Option<NaiveDate>, analytes: Vec<AnalyteRecord>) -> AnalyteGroup {
        AnalyteGroup {
            document_date: date,
            document_name: name.to_string(),
            analytes,
        }
    }

    #[test]
    fn report_carries_group_descriptors_and_entries() {
        let earlier = group(
            "martie.pdf",
            NaiveDate::from_ymd_opt(2024, 3, 15),
            vec![record("Glicemie", Some("BIOCHIMIE"), 140.0)],
        );
        let later = group(
            "iunie.pdf",
            NaiveDate::from_ymd_opt(2024, 6, 20),
            vec![record("Glicemie", Some("BIOCHIMIE"), 100.0)],
        );
        let report = build_report(&earlier, &later);

        assert_eq!(report.earlier_document_name, "martie.pdf");
        assert_eq!(report.later_document_name, "iunie.pdf");
        assert_eq!(report.entries.len(), 1);

        let entry = &report.entries[0];
        assert_eq!(entry.name, "Glicemie");
        assert_eq!(entry.trend, Trend::Improved);
        assert!(entry.message.contains("revenit în limite"));
        assert!(entry.earlier_abnormal);
        assert!(!entry.later_abnormal);
        assert_eq!(entry.earlier_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(entry.later_date, NaiveDate::from_ymd_opt(2024, 6, 20));
    }

    #[test]
    fn display_fields_prefer_the_later_side() {
        let mut old = record("Glicemie", Some("VECHI"), 95.0);
        old.unit = Some("mmol/L".to_string());
        let new = record("Glicemie", Some("BIOCHIMIE"), 96.0);
        let report = build_report(
            &group("a.pdf", None, vec![old]),
            &group("b.pdf", None, vec![new]),
        );
        let entry = &report.entries[0];
        assert_eq!(entry.category.as_deref(), Some("BIOCHIMIE"));
        assert_eq!(entry.unit.as_deref(), Some("mg/dL"));
    }

    #[test]
    fn later_only_entry_is_new_and_indeterminate() {
        let earlier = group("a.pdf", None, vec![record("Glicemie", None, 95.0)]);
        let later = group(
            "b.pdf",
            NaiveDate::from_ymd_opt(2024, 6, 20),
            vec![
                record("Glicemie", None, 96.0),
                record("Vitamina D", None, 32.0),
            ],
        );
        let report = build_report(&earlier, &later);
        assert_eq!(report.entries.len(), 2);

        let vitamin = report
            .entries
            .iter()
            .find(|e| e.name == "Vitamina D")
            .unwrap();
        assert!(vitamin.is_new());
        assert!(!vitamin.is_discontinued());
        assert_eq!(vitamin.trend, Trend::Indeterminate);
        assert_eq!(vitamin.message, "");
        assert_eq!(vitamin.earlier_date, None);
        assert_eq!(vitamin.later_date, NaiveDate::from_ymd_opt(2024, 6, 20));
    }

    #[test]
    fn earlier_only_entry_is_discontinued() {
        let earlier = group("a.pdf", None, vec![record("Fier seric", None, 80.0)]);
        let later = group("b.pdf", None, vec![]);
        let report = build_report(&earlier, &later);
        assert_eq!(report.entries.len(), 1);
        assert!(report.entries[0].is_discontinued());
    }

    #[test]
    fn entries_sort_by_category_then_name_with_uncategorized_last() {
        let earlier = group(
            "a.pdf",
            None,
            vec![
                record("Fara categorie", None, 95.0),
                record("Glicemie", Some("BIOCHIMIE"), 95.0),
                record("Leucocite", Some("HEMATOLOGIE"), 95.0),
                record("Albumina", Some("BIOCHIMIE"), 95.0),
            ],
        );
        let later = group("b.pdf", None, vec![]);
        let report = build_report(&earlier, &later);

        let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["Albumina", "Glicemie", "Leucocite", "Fara categorie"]
        );
    }

    #[test]
    fn record_dates_override_group_dates() {
        let mut r = record("Glicemie", None, 95.0);
        r.collection_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        let earlier = group("a.pdf", NaiveDate::from_ymd_opt(2024, 3, 15), vec![r]);
        let later = group("b.pdf", None, vec![record("Glicemie", None, 96.0)]);
        let report = build_report(&earlier, &later);
        assert_eq!(
            report.entries[0].earlier_date,
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(report.entries[0].later_date, None);
    }
}
