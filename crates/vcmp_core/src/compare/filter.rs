//! Filter graph text helpers.
//!
//! Text handed to `drawtext` passes three parsers before it is drawn: the
//! filter graph parser, the filter option parser, and drawtext's own
//! expansion. Each level gets its own escaping, applied innermost first.

/// Escape overlay text for use as an unquoted `drawtext` `text=` value
/// inside a `-filter_complex` graph.
pub fn escape_drawtext(text: &str) -> String {
    let expanded = escape_with(text, |c| matches!(c, '\\' | '%'));
    escape_option_value(&expanded)
}

/// Escape a filter option value that is not expanded, such as a font path.
pub(crate) fn escape_option_value(value: &str) -> String {
    let option = escape_with(value, |c| matches!(c, '\\' | '\'' | ':'));
    escape_with(&option, |c| matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';'))
}

fn escape_with(text: &str, special: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Format a speed factor for `setpts`, without trailing zeros.
pub(crate) fn format_factor(value: f64) -> String {
    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
