use tracing::{debug, warn};

use super::formats::{find_by_key, LabParser, REGISTRY, UNIVERSAL};

/// Resolve the parser for a document. A hint naming a known laboratory skips
/// detection entirely; the `universal` hint and unknown hints auto-detect.
pub fn select_parser(text: &str, hint: &str) -> &'static dyn LabParser {
    if hint == UNIVERSAL.key() {
        return detect_parser(text);
    }
    if let Some(parser) = find_by_key(hint) {
        debug!(parser = parser.key(), "Laboratory chosen by hint");
        return parser;
    }
    warn!(hint, "Unknown laboratory hint, falling back to auto-detection");
    detect_parser(text)
}

/// First registry entry whose signature appears in the text wins; the
/// universal parser backstops everything else.
pub fn detect_parser(text: &str) -> &'static dyn LabParser {
    for parser in REGISTRY {
        if parser.signature_matches(text) {
            debug!(parser = parser.key(), "Laboratory signature matched");
            return parser;
        }
    }
    debug!("No laboratory signature matched, using the universal parser");
    UNIVERSAL
}
