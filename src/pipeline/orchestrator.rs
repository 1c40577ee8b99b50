use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::detect::select_parser;
use super::formats::UNIVERSAL;
use super::metadata::extract_metadata;
use super::normalize::{normalize_record, DocumentContext};
use super::sanitize::sanitize_report_text;
use super::ParseError;
use crate::models::{AnalyteRecord, ParseResult};

/// A named laboratory format yielding fewer rows than this is suspicious
/// enough to warn about; real bulletins carry at least a handful.
const MIN_EXPECTED_ROWS: usize = 3;

/// Parse a report file. The file name becomes the records' source document.
pub fn parse_file(path: &Path, hint: &str) -> Result<ParseResult, ParseError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    parse_stream(File::open(path)?, &file_name, hint)
}

/// Parse a report from any reader. Reading is the only fallible step; the
/// bytes are decoded lossily so binary junk cannot abort the pipeline.
pub fn parse_stream<R: Read>(
    mut reader: R,
    file_name: &str,
    hint: &str,
) -> Result<ParseResult, ParseError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_text(&text, file_name, hint))
}

/// Parse already-extracted report text. Infallible: malformed content comes
/// back as an unsuccessful `ParseResult`, never as an error.
pub fn parse_text(text: &str, file_name: &str, hint: &str) -> ParseResult {
    // Step 1: clean up the raw extractor output.
    let text = sanitize_report_text(text);
    if text.trim().is_empty() {
        warn!(file = file_name, "Document produced no usable text");
        return ParseResult::failure("Nu s-a putut extrage text din document");
    }

    // Step 2: pick the laboratory strategy.
    let parser = select_parser(&text, hint);
    info!(
        file = file_name,
        parser = parser.key(),
        "Parsing laboratory report"
    );

    // Step 3: tokenize rows with the chosen strategy.
    let raw_records = parser.parse(&text);
    if raw_records.is_empty() {
        warn!(
            file = file_name,
            parser = parser.key(),
            "No analytes recognized in document"
        );
        return ParseResult::failure("Nu s-au putut extrage analize din document");
    }

    // Step 4: document-level metadata, independent of the row grammar.
    let metadata = extract_metadata(&text);

    // Step 5: normalize raw tuples into finalized records.
    let laboratory =
        (parser.key() != UNIVERSAL.key()).then(|| parser.display_name().to_string());
    let ctx = DocumentContext {
        collection_date: metadata.collection_date,
        laboratory: laboratory.as_deref(),
        source_document: file_name,
    };
    let analytes: Vec<AnalyteRecord> = raw_records
        .iter()
        .map(|raw| normalize_record(raw, &ctx))
        .collect();

    // Step 6: assemble the document result.
    let mut warnings = Vec::new();
    if laboratory.is_some() && analytes.len() < MIN_EXPECTED_ROWS {
        warnings.push(format!(
            "Doar {} analize recunoscute de formatul {}",
            analytes.len(),
            parser.display_name()
        ));
    }
    if metadata.collection_date.is_none() {
        warnings.push("Data recoltării nu a fost găsită în document".to_string());
    }
    let abnormal_count = analytes.iter().filter(|a| a.abnormal).count();
    info!(
        file = file_name,
        total = analytes.len(),
        abnormal = abnormal_count,
        "Report parsed"
    );

    ParseResult {
        success: true,
        error: None,
        total_count: analytes.len(),
        abnormal_count,
        analytes,
        collection_date: metadata.collection_date,
        laboratory,
        report_number: metadata.report_number,
        patient_name: metadata.patient_name,
        patient_cnp: metadata.patient_cnp,
        warnings,
        parser_used: Some(parser.key().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SYNEVO_REPORT: &str = "\
SYNEVO ROMANIA SRL
Pacient: Maria Ionescu
Data recoltarii: 15.03.2024
Nr. buletin: 2024-00123

HEMATOLOGIE
Hemoglobina (HGB)     13.5       g/dL      12.0 - 16.0
* Leucocite           15.8       10^3/µL   4.0 - 10.0
Trombocite            250        10^3/µL   150 - 400

BIOCHIMIE
Glicemie              95         mg/dL     70 - 110
";

    #[test]
    fn full_document_parse_detects_and_normalizes() {
        let result = parse_text(SYNEVO_REPORT, "analize_martie.pdf", "universal");
        assert!(result.success);
        assert_eq!(result.parser_used.as_deref(), Some("synevo"));
        assert_eq!(result.laboratory.as_deref(), Some("Synevo"));
        assert_eq!(result.total_count, 4);
        assert_eq!(result.abnormal_count, 1);
        assert_eq!(
            result.collection_date,
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(result.report_number.as_deref(), Some("2024-00123"));
        assert_eq!(result.patient_name.as_deref(), Some("Maria Ionescu"));
        assert!(result.warnings.is_empty());

        let leucocite = &result.analytes[1];
        assert_eq!(leucocite.value, Some(15.8));
        assert!(leucocite.abnormal);
        assert_eq!(
            leucocite.collection_date,
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(leucocite.laboratory.as_deref(), Some("Synevo"));
        assert_eq!(leucocite.source_document, "analize_martie.pdf");
    }

    #[test]
    fn unparseable_document_fails_gracefully() {
        let result = parse_text(
            "Scrisoare medicala fara analize.\nRecomandari generale.",
            "scrisoare.pdf",
            "universal",
        );
        assert!(!result.success);
        assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(result.analytes.is_empty());
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn empty_document_reports_extraction_failure() {
        let result = parse_text("\0\u{1}\n\n", "gol.pdf", "universal");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Nu s-a putut extrage text din document")
        );
    }

    #[test]
    fn parsing_is_deterministic_modulo_ids() {
        let first = parse_text(SYNEVO_REPORT, "a.pdf", "universal");
        let second = parse_text(SYNEVO_REPORT, "a.pdf", "universal");
        let strip = |r: &ParseResult| {
            r.analytes
                .iter()
                .map(|a| (a.name.clone(), a.value_text.clone(), a.abnormal))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(first.abnormal_count, second.abnormal_count);
    }

    #[test]
    fn sparse_named_format_output_warns() {
        let text = "MEDLIFE S.A.\nHemoglobina 13.8 g/dL 13.0 - 17.5\n";
        let result = parse_text(text, "medlife.pdf", "universal");
        assert!(result.success);
        assert_eq!(result.parser_used.as_deref(), Some("medlife"));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("analize recunoscute")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Data recoltării")));
    }

    #[test]
    fn universal_parse_sets_no_laboratory() {
        let text = "Hemoglobina   13.5   g/dL   12.0 - 16.0\n\
                    Glicemie   95   mg/dL   70 - 110\n\
                    Creatinina   0,9   mg/dL   0,6 - 1,2";
        let result = parse_text(text, "necunoscut.pdf", "universal");
        assert!(result.success);
        assert_eq!(result.laboratory, None);
        assert_eq!(result.parser_used.as_deref(), Some("universal"));
        assert!(result.warnings.iter().all(|w| !w.contains("formatul")));
    }

    #[test]
    fn hint_overrides_detection_end_to_end() {
        let result = parse_text(SYNEVO_REPORT, "a.pdf", "sanador");
        assert_eq!(result.parser_used.as_deref(), Some("sanador"));
        assert_eq!(result.laboratory.as_deref(), Some("Sanador"));
    }

    #[test]
    fn stream_and_file_entry_points_read_the_same_content() {
        use std::io::Write as _;

        let from_stream =
            parse_stream(SYNEVO_REPORT.as_bytes(), "analize.pdf", "universal").unwrap();
        assert!(from_stream.success);
        assert_eq!(from_stream.total_count, 4);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SYNEVO_REPORT.as_bytes()).unwrap();
        let from_file = parse_file(file.path(), "universal").unwrap();
        assert!(from_file.success);
        assert_eq!(from_file.total_count, 4);
        assert_eq!(
            from_file.analytes[0].source_document,
            file.path().file_name().unwrap().to_str().unwrap()
        );
    }
}
