pub mod detect;
pub mod formats;
pub mod metadata;
pub mod normalize;
pub mod orchestrator;
pub mod sanitize;
pub mod types;

pub use detect::{detect_parser, select_parser};
pub use formats::{find_by_key, supported_laboratories, LabFormatInfo, LabParser};
pub use orchestrator::{parse_file, parse_stream, parse_text};
pub use sanitize::sanitize_report_text;
pub use types::{DocumentMetadata, RawAnalyte};

use thiserror::Error;

/// The pipeline's only hard failure: reading the document stream. Content
/// problems degrade inside `ParseResult` instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
