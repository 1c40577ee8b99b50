use crate::models::{AnalyteRecord, Trend};

/// Numeric changes within this band are reported as noise, not movement.
pub const TOLERANCE_PERCENT: f64 = 2.0;

/// Outcome of classifying one aligned pair.
pub struct Classification {
    pub absolute_difference: Option<f64>,
    pub percentage_difference: Option<f64>,
    pub trend: Trend,
    pub message: String,
}

/// Classify the change between two sides of a pair. Total: missing sides,
/// zero baselines and unknown qualitative transitions all get a defined
/// answer.
pub fn classify(earlier: Option<&AnalyteRecord>, later: Option<&AnalyteRecord>) -> Classification {
    match (earlier, later) {
        (Some(e), Some(l)) => match (e.value, l.value) {
            (Some(ev), Some(lv)) => classify_numeric(ev, lv, e.abnormal, l.abnormal),
            _ => classify_qualitative(e, l),
        },
        _ => Classification {
            absolute_difference: None,
            percentage_difference: None,
            trend: Trend::Indeterminate,
            message: String::new(),
        },
    }
}

fn classify_numeric(
    earlier: f64,
    later: f64,
    earlier_abnormal: bool,
    later_abnormal: bool,
) -> Classification {
    let absolute = later - earlier;

    if earlier == 0.0 {
        // No baseline to take a percentage against; the absolute difference
        // drives the same branches instead.
        if absolute == 0.0 {
            return Classification {
                absolute_difference: Some(0.0),
                percentage_difference: None,
                trend: Trend::Stable,
                message: "≈ Stabil".to_string(),
            };
        }
        let rising = later > earlier;
        let (trend, annotation) = direction_trend(rising, earlier_abnormal, later_abnormal);
        let delta = round1(absolute);
        let message = if rising {
            format!("↑ +{delta}{annotation}")
        } else {
            format!("↓ {delta}{annotation}")
        };
        return Classification {
            absolute_difference: Some(absolute),
            percentage_difference: None,
            trend,
            message,
        };
    }

    let percentage = round1((later - earlier) / earlier * 100.0);
    if percentage.abs() <= TOLERANCE_PERCENT {
        return Classification {
            absolute_difference: Some(absolute),
            percentage_difference: Some(percentage),
            trend: Trend::Stable,
            message: "≈ Stabil".to_string(),
        };
    }
    let rising = later > earlier;
    let (trend, annotation) = direction_trend(rising, earlier_abnormal, later_abnormal);
    let message = if rising {
        format!("↑ +{percentage}%{annotation}")
    } else {
        format!("↓ {percentage}%{annotation}")
    };
    Classification {
        absolute_difference: Some(absolute),
        percentage_difference: Some(percentage),
        trend,
        message,
    }
}

/// Crossing the reference limits outranks the raw direction of movement.
fn direction_trend(
    rising: bool,
    earlier_abnormal: bool,
    later_abnormal: bool,
) -> (Trend, &'static str) {
    if earlier_abnormal && !later_abnormal {
        (Trend::Improved, " (revenit în limite)")
    } else if !earlier_abnormal && later_abnormal {
        (Trend::Worsened, " (ieșit din limite!)")
    } else if rising {
        (Trend::Increased, "")
    } else {
        (Trend::Decreased, "")
    }
}

fn classify_qualitative(earlier: &AnalyteRecord, later: &AnalyteRecord) -> Classification {
    let earlier_text = earlier.value_text.trim();
    let later_text = later.value_text.trim();
    let earlier_lower = earlier_text.to_lowercase();
    let later_lower = later_text.to_lowercase();

    if earlier_lower == later_lower {
        return Classification {
            absolute_difference: None,
            percentage_difference: None,
            trend: Trend::Stable,
            message: "Neschimbat".to_string(),
        };
    }

    let trend = if earlier.abnormal && !later.abnormal {
        Trend::Improved
    } else if !earlier.abnormal && later.abnormal {
        Trend::Worsened
    } else {
        qualitative_trend(&earlier_lower, &later_lower)
    };
    Classification {
        absolute_difference: None,
        percentage_difference: None,
        trend,
        message: format!("{earlier_text} → {later_text}"),
    }
}

/// Lexical transitions the bulletins actually print.
fn qualitative_trend(earlier: &str, later: &str) -> Trend {
    if earlier.contains("pozitiv") && later.contains("negativ") {
        Trend::Improved
    } else if earlier.contains("negativ") && later.contains("pozitiv") {
        Trend::Worsened
    } else if earlier.contains("frecvent") && later.contains("rar") {
        Trend::Improved
    } else if earlier.contains("rar") && later.contains("frecvent") {
        Trend::Worsened
    } else {
        Trend::Indeterminate
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AbnormalDirection;
    use uuid::Uuid;

    fn record(value_text: &str, value: Option<f64>, abnormal: bool) -> AnalyteRecord {
        AnalyteRecord {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            code: None,
            category: None,
            value,
            value_text: value_text.to_string(),
            unit: None,
            reference_range_text: None,
            reference_range_low: None,
            reference_range_high: None,
            qualitative_range: None,
            abnormal,
            abnormal_direction: AbnormalDirection::None,
            collection_date: None,
            laboratory: None,
            source_document: "test.pdf".to_string(),
        }
    }

    #[test]
    fn small_change_is_stable() {
        let c = classify_numeric(11.5, 11.6, false, false);
        assert_eq!(c.trend, Trend::Stable);
        assert_eq!(c.message, "≈ Stabil");
        assert_eq!(c.percentage_difference, Some(0.9));
    }

    #[test]
    fn tolerance_band_overrides_abnormal_flags() {
        let c = classify_numeric(100.0, 102.0, true, true);
        assert_eq!(c.percentage_difference, Some(2.0));
        assert_eq!(c.trend, Trend::Stable);
    }

    #[test]
    fn return_into_limits_is_improvement() {
        let c = classify_numeric(140.0, 100.0, true, false);
        assert_eq!(c.trend, Trend::Improved);
        assert_eq!(c.message, "↓ -28.6% (revenit în limite)");
        assert_eq!(c.absolute_difference, Some(-40.0));
    }

    #[test]
    fn leaving_limits_is_worsening() {
        let c = classify_numeric(95.0, 245.0, false, true);
        assert_eq!(c.trend, Trend::Worsened);
        assert_eq!(c.message, "↑ +157.9% (ieșit din limite!)");
    }

    #[test]
    fn plain_moves_are_increase_and_decrease() {
        let up = classify_numeric(100.0, 125.0, false, false);
        assert_eq!(up.trend, Trend::Increased);
        assert_eq!(up.message, "↑ +25%");

        let down = classify_numeric(100.0, 75.0, false, false);
        assert_eq!(down.trend, Trend::Decreased);
        assert_eq!(down.message, "↓ -25%");
    }

    #[test]
    fn zero_baseline_classifies_on_absolute_difference() {
        let c = classify_numeric(0.0, 25.0, false, false);
        assert_eq!(c.percentage_difference, None);
        assert_eq!(c.absolute_difference, Some(25.0));
        assert_eq!(c.trend, Trend::Increased);
        assert_eq!(c.message, "↑ +25");
    }

    #[test]
    fn zero_to_zero_is_stable() {
        let c = classify_numeric(0.0, 0.0, false, false);
        assert_eq!(c.trend, Trend::Stable);
        assert_eq!(c.message, "≈ Stabil");
        assert_eq!(c.percentage_difference, None);
    }

    #[test]
    fn equal_qualitative_results_are_unchanged() {
        let e = record("Negativ", None, false);
        let l = record("negativ", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Stable);
        assert_eq!(c.message, "Neschimbat");
    }

    #[test]
    fn positive_to_negative_improves() {
        let e = record("Pozitiv", None, false);
        let l = record("Negativ", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Improved);
        assert_eq!(c.message, "Pozitiv → Negativ");
    }

    #[test]
    fn rare_to_frequent_worsens() {
        let e = record("Rare", None, false);
        let l = record("Frecvente", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Worsened);
        assert_eq!(c.message, "Rare → Frecvente");
    }

    #[test]
    fn abnormal_flags_decide_unknown_qualitative_pairs() {
        let e = record("Prezent", None, true);
        let l = record("Absent", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Improved);
    }

    #[test]
    fn unknown_qualitative_transition_is_indeterminate() {
        let e = record("Galben", None, false);
        let l = record("Verde", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Indeterminate);
        assert_eq!(c.message, "Galben → Verde");
    }

    #[test]
    fn one_sided_pairs_are_indeterminate_with_empty_message() {
        let l = record("25", Some(25.0), false);
        let c = classify(None, Some(&l));
        assert_eq!(c.trend, Trend::Indeterminate);
        assert_eq!(c.message, "");
        assert_eq!(c.absolute_difference, None);
        assert_eq!(c.percentage_difference, None);
    }

    #[test]
    fn mixed_numeric_and_qualitative_compares_as_text() {
        let e = record("13.5", Some(13.5), false);
        let l = record("Hemolizat", None, false);
        let c = classify(Some(&e), Some(&l));
        assert_eq!(c.trend, Trend::Indeterminate);
        assert_eq!(c.message, "13.5 → Hemolizat");
    }
}
