/// Sanitize extracted report text before parsing.
/// Strips control characters, normalizes whitespace, preserves the
/// punctuation and symbols laboratory layouts rely on.
pub fn sanitize_report_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '['
                        | ']'
                        | '+'
                        | '='
                        | '%'
                        | '#'
                        | '&'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '<'
                        | '>'
                        | '*'
                        | '_'
                        | '|'
                        | '^'
                        | '°'
                        | '²'
                        | '³'
                        | 'µ'
                        | '\u{2013}' // En-dash, used in printed reference ranges
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
