pub mod bioclinica;
pub mod clinica_sante;
pub mod elite_medical;
pub mod gral;
pub mod medlife;
pub mod promed;
pub mod regina_maria;
pub mod sanador;
pub mod smartlabs;
pub mod synevo;
pub mod universal;

pub use bioclinica::Bioclinica;
pub use clinica_sante::ClinicaSante;
pub use elite_medical::EliteMedical;
pub use gral::Gral;
pub use medlife::MedLife;
pub use promed::ProMed;
pub use regina_maria::ReginaMaria;
pub use sanador::Sanador;
pub use smartlabs::SmartLabs;
pub use synevo::Synevo;
pub use universal::Universal;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::types::RawAnalyte;

/// One laboratory layout strategy. Each implementation owns exactly one
/// layout; new laboratories are added as new implementations plus a registry
/// row, never by editing an existing one.
pub trait LabParser: Send + Sync {
    /// Stable key used for format hints and the catalog.
    fn key(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Layout-distinctive substrings from the lab's header or column layout.
    /// Empty for the fallback strategy.
    fn signatures(&self) -> &'static [&'static str];
    /// Tokenize raw text into candidate analyte tuples, tagged with the
    /// active category context. Zero tuples is a valid outcome.
    fn parse(&self, text: &str) -> Vec<RawAnalyte>;

    fn signature_matches(&self, text: &str) -> bool {
        self.signatures().iter().any(|s| text.contains(s))
    }
}

/// Detection priority order. The universal fallback is not listed here; it is
/// always tried last.
pub static REGISTRY: [&(dyn LabParser); 10] = [
    &ReginaMaria,
    &Synevo,
    &MedLife,
    &Bioclinica,
    &ClinicaSante,
    &SmartLabs,
    &EliteMedical,
    &ProMed,
    &Sanador,
    &Gral,
];

pub static UNIVERSAL: &(dyn LabParser) = &Universal;

/// Resolve a hint key to its strategy, including the fallback's own key.
pub fn find_by_key(key: &str) -> Option<&'static dyn LabParser> {
    if key == UNIVERSAL.key() {
        return Some(UNIVERSAL);
    }
    REGISTRY.iter().copied().find(|p| p.key() == key)
}

/// Catalog row surfaced to callers for the format-hint parameter.
#[derive(Debug, Clone, Serialize)]
pub struct LabFormatInfo {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Static read-only list of supported layouts, auto-detection first.
pub fn supported_laboratories() -> Vec<LabFormatInfo> {
    std::iter::once(UNIVERSAL)
        .chain(REGISTRY.iter().copied())
        .map(|p| LabFormatInfo {
            key: p.key(),
            display_name: p.display_name(),
            description: p.description(),
        })
        .collect()
}

/// Section banners recognized on lab reports. A banner updates the category
/// context for subsequent rows and is never emitted as an analyte.
pub(crate) const CATEGORY_NAMES: &[&str] = &[
    "HEMATOLOGIE",
    "BIOCHIMIE",
    "IMUNOLOGIE",
    "SEROLOGIE",
    "COAGULARE",
    "HORMONI",
    "ENDOCRINOLOGIE",
    "MARKERI TUMORALI",
    "ANALIZE DE URINA",
    "ANALIZE DE URINĂ",
    "SUMAR URINA",
    "SUMAR URINĂ",
    "EXAMEN URINA",
    "EXAMEN URINĂ",
    "PROFIL LIPIDIC",
    "PROFIL HEPATIC",
    "PROFIL RENAL",
    "LIPIDE",
    "TIROID",
    "VSH",
];

/// Units printed by the supported laboratories. Matching is case-insensitive
/// and exact per token.
pub(crate) const KNOWN_UNITS: &[&str] = &[
    "g/dL",
    "g/L",
    "mg/dL",
    "mg/L",
    "µg/dL",
    "µg/L",
    "ng/mL",
    "ng/dL",
    "pg/mL",
    "pg",
    "fL",
    "U/L",
    "UI/L",
    "UI/mL",
    "mU/L",
    "µU/mL",
    "mmol/L",
    "µmol/L",
    "nmol/L",
    "mEq/L",
    "10^3/µL",
    "10^6/µL",
    "10^9/L",
    "10^12/L",
    "/µL",
    "/mm³",
    "mil/mm³",
    "mii/mm³",
    "%",
    "mm/h",
    "mm/1h",
    "sec",
    "secunde",
    "UI",
];

/// A banner is a short line with no digits that names a known category.
pub(crate) fn detect_category(line: &str) -> Option<String> {
    if line.chars().count() >= 60 || line.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let upper = line.to_uppercase();
    CATEGORY_NAMES
        .iter()
        .find(|c| upper.contains(*c))
        .map(|c| (*c).to_string())
}

/// Column-header rows of tabular layouts ("Denumire  Rezultat  UM ...").
pub(crate) fn is_table_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("denumire")
        || lower.contains("rezultat")
        || lower.contains("interval")
        || lower.contains("metoda")
        || lower.contains("valori normale")
    {
        return true;
    }
    lower.split_whitespace().any(|t| t == "um")
}

static ROW_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s*").unwrap());

/// Collapse whitespace, strip leading row numbering ("12. ", "3) ") and
/// trailing markers from an analyte name.
pub(crate) fn clean_analyte_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let unnumbered = ROW_NUMBER_PREFIX.replace(&collapsed, "");
    unnumbered
        .trim_matches(|c: char| c == '*' || c == '-' || c == ':' || c.is_whitespace())
        .to_string()
}

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z][A-Z0-9]{1,9})\)").unwrap());

/// Short uppercase identifier printed in parentheses next to the name.
pub(crate) fn extract_code(name: &str) -> Option<String> {
    CODE_PATTERN.captures(name).map(|cap| cap[1].to_string())
}

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[<>]?\d+(?:[.,]\d+)*\*?$").unwrap());

/// A token that is wholly a printed number: optional comparison operator,
/// digit groups with comma/period separators, optional abnormal asterisk.
pub(crate) fn is_number_token(token: &str) -> bool {
    NUMBER_TOKEN.is_match(token)
}

/// Exact table lookup, case-insensitive.
pub(crate) fn is_known_unit(token: &str) -> bool {
    KNOWN_UNITS.iter().any(|u| u.eq_ignore_ascii_case(token))
}

/// A token that plausibly prints a unit of measure.
pub(crate) fn looks_like_unit(token: &str) -> bool {
    is_known_unit(token)
        || token == "%"
        || (token.contains('/') && token.chars().any(|c| c.is_alphabetic()))
}

static RANGE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)*\s*[-–]\s*\d+(?:[.,]\d+)*").unwrap()
});
static RANGE_BOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[<>]\s*=?\s*\d+(?:[.,]\d+)*$").unwrap());

/// Find the reference-range fragment inside trailing row text, if any:
/// either a "min - max" span or a single "< max" / "> min" bound.
pub(crate) fn extract_range_text(text: &str) -> Option<String> {
    if let Some(m) = RANGE_SPAN.find(text) {
        return Some(m.as_str().to_string());
    }
    let trimmed = text.trim().trim_matches(|c| c == '[' || c == ']' || c == '(' || c == ')');
    if RANGE_BOUND.is_match(trimmed.trim()) {
        return Some(trimmed.trim().to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_are_unique() {
        let mut keys: Vec<&str> = REGISTRY.iter().map(|p| p.key()).collect();
        keys.push(UNIVERSAL.key());
        let mut deduped = keys.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }

    #[test]
    fn catalog_lists_universal_first_then_all_labs() {
        let catalog = supported_laboratories();
        assert_eq!(catalog.len(), REGISTRY.len() + 1);
        assert_eq!(catalog[0].key, "universal");
        assert!(catalog.iter().all(|info| !info.display_name.is_empty()));
        assert!(catalog.iter().all(|info| !info.description.is_empty()));
    }

    #[test]
    fn find_by_key_resolves_every_catalog_entry() {
        for info in supported_laboratories() {
            let parser = find_by_key(info.key).unwrap();
            assert_eq!(parser.key(), info.key);
        }
        assert!(find_by_key("no_such_lab").is_none());
    }

    #[test]
    fn named_parsers_always_carry_signatures() {
        for parser in REGISTRY {
            assert!(!parser.signatures().is_empty(), "{}", parser.key());
        }
        assert!(UNIVERSAL.signatures().is_empty());
    }

    #[test]
    fn category_banner_detected_on_short_uppercase_lines() {
        assert_eq!(detect_category("HEMATOLOGIE").as_deref(), Some("HEMATOLOGIE"));
        assert_eq!(detect_category("Biochimie serica").as_deref(), Some("BIOCHIMIE"));
        assert_eq!(detect_category("VSH").as_deref(), Some("VSH"));
    }

    #[test]
    fn category_banner_rejects_value_rows() {
        // Rows carry digits, banners never do.
        assert_eq!(detect_category("VSH 12 mm/h 1 - 15"), None);
        assert_eq!(detect_category("Colesterol 210 mg/dL"), None);
    }

    #[test]
    fn clean_name_strips_numbering_and_markers() {
        assert_eq!(clean_analyte_name("12. Hemoglobina *"), "Hemoglobina");
        assert_eq!(clean_analyte_name("  Fier   seric :"), "Fier seric");
        assert_eq!(clean_analyte_name("3) Glicemie"), "Glicemie");
    }

    #[test]
    fn extract_code_reads_parenthetical_identifier() {
        assert_eq!(extract_code("Hemoglobina (HGB)").as_deref(), Some("HGB"));
        assert_eq!(extract_code("Tiroxina libera (FT4)").as_deref(), Some("FT4"));
        assert_eq!(extract_code("Glicemie"), None);
        // Numeric parentheticals are not codes.
        assert_eq!(extract_code("Vitamina D (25)"), None);
    }

    #[test]
    fn number_tokens_accept_operators_thousands_and_markers() {
        for token in ["95", "13,5", "5.490.000", "<0.5", ">120", "7.2*"] {
            assert!(is_number_token(token), "{token}");
        }
        for token in ["B12", "mg/dL", "7.2%", "12-16", ""] {
            assert!(!is_number_token(token), "{token}");
        }
    }

    #[test]
    fn unit_recognition_covers_table_and_slash_forms() {
        assert!(looks_like_unit("g/dL"));
        assert!(looks_like_unit("MMOL/L"));
        assert!(looks_like_unit("%"));
        assert!(looks_like_unit("x10/L"));
        assert!(!looks_like_unit("Hemoglobina"));
        assert!(!looks_like_unit("12-16"));
    }

    #[test]
    fn range_extraction_finds_spans_and_single_bounds() {
        assert_eq!(
            extract_range_text("12.0 - 16.0").as_deref(),
            Some("12.0 - 16.0")
        );
        assert_eq!(
            extract_range_text("[ 4,2 – 5,9 ] text dupa").as_deref(),
            Some("4,2 – 5,9")
        );
        assert_eq!(extract_range_text("< 5.1").as_deref(), Some("< 5.1"));
        assert_eq!(extract_range_text("Negativ"), None);
    }
}
