/// Terminator mandated for serialized feeds.
pub const OUTPUT_LINE_ENDING: &str = "\r\n";

/// Convert CRLF and lone CR terminators to LF.
pub fn normalize_line_endings(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

/// Unfolded logical lines of `text`, without terminators.
///
/// A line starting with SPACE or HTAB continues the previous logical line;
/// that single whitespace character and the preceding terminator are removed.
/// Blank lines are dropped before continuations are considered, so a
/// continuation after a blank line still joins the last non-blank line. A
/// continuation with nothing before it is kept as is.
pub fn unfolded_lines(text: &str) -> Vec<String> {
    let normalized = normalize_line_endings(text);
    let mut lines: Vec<String> = Vec::new();
    for line in normalized.split('\n') {
        if line.is_empty() {
            continue;
        }
        let continuation = line.strip_prefix(|c: char| c == ' ' || c == '\t');
        match (continuation, lines.last_mut()) {
            (Some(rest), Some(previous)) => previous.push_str(rest),
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

/// Unfold `text` into LF-terminated logical lines.
///
/// Idempotent: `unfold(&unfold(x)) == unfold(x)`.
pub fn unfold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in unfolded_lines(text) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
