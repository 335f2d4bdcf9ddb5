use crate::filter::FilterRule;
use crate::marker::{CALENDAR_BEGIN, CALENDAR_END};
use crate::text::OUTPUT_LINE_ENDING;

/// Calendar-level lines: the header before the first entry and whatever
/// follows entries (timezones, `X-WR-*` properties) up to `END:VCALENDAR`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarWrapper {
    lines: Vec<String>,
    trailing_lines: Vec<String>,
}

impl CalendarWrapper {
    pub(crate) fn new(lines: Vec<String>, trailing_lines: Vec<String>) -> Self {
        Self {
            lines,
            trailing_lines,
        }
    }

    /// Header lines, excluding the envelope markers themselves.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Calendar-level lines that appeared after entries, in source order.
    pub fn trailing_lines(&self) -> &[String] {
        &self.trailing_lines
    }
}

/// One `BEGIN:VEVENT` .. `END:VEVENT` block as unfolded logical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    lines: Vec<String>,
}

impl Entry {
    pub(crate) fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Unfolded text, one logical line per `\n`-terminated line.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Value of the first `SUMMARY` property, parameters skipped.
    pub fn summary(&self) -> Option<&str> {
        self.lines.iter().find_map(|line| property_value(line, "SUMMARY"))
    }
}

/// Value of `line` when its property name is `name`.
///
/// The value starts after the first colon outside a quoted parameter value.
fn property_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let head = line.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let rest = &line[name.len()..];
    if !rest.starts_with(|c: char| c == ':' || c == ';') {
        return None;
    }
    let mut quoted = false;
    for (idx, c) in rest.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some(&rest[idx + 1..]),
            _ => {}
        }
    }
    None
}

/// Feed split into wrapper and structurally valid entries, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub wrapper: CalendarWrapper,
    pub entries: Vec<Entry>,
    /// Entries dropped for a missing `END:VEVENT` or an embedded calendar marker.
    pub corrupt_entries: usize,
    /// Unmatched `END:VEVENT` lines and lines ahead of the first entry that
    /// were dropped.
    pub stray_lines: usize,
    /// Duplicate `BEGIN:VCALENDAR`/`END:VCALENDAR` lines that were dropped.
    pub collapsed_markers: usize,
}

impl ParsedFeed {
    /// Drop every entry matched by `rules`, keeping source order.
    pub fn filter(self, rules: &FilterRule) -> CleanedFeed {
        let entries_in = self.entries.len();
        let mut excluded = Vec::new();
        let mut kept = Vec::with_capacity(entries_in);

        for entry in self.entries {
            match rules.matched_phrase(&entry.text()) {
                Some(phrase) => excluded.push(ExcludedEntry {
                    title: entry.summary().map(str::to_string),
                    phrase: phrase.to_string(),
                }),
                None => kept.push(entry),
            }
        }

        let report = FilterReport {
            entries_in,
            entries_kept: kept.len(),
            excluded,
            corrupt_entries: self.corrupt_entries,
            stray_lines: self.stray_lines,
            collapsed_markers: self.collapsed_markers,
        };

        CleanedFeed {
            wrapper: self.wrapper,
            entries: kept,
            report,
        }
    }
}

/// An entry removed by the filter, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedEntry {
    pub title: Option<String>,
    /// The lowercased phrase that matched.
    pub phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Structurally valid entries seen by the filter.
    pub entries_in: usize,
    pub entries_kept: usize,
    pub excluded: Vec<ExcludedEntry>,
    pub corrupt_entries: usize,
    pub stray_lines: usize,
    pub collapsed_markers: usize,
}

/// Wrapper plus retained entries, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedFeed {
    pub wrapper: CalendarWrapper,
    pub entries: Vec<Entry>,
    pub report: FilterReport,
}

impl CleanedFeed {
    /// Serialize with exactly one envelope and CRLF after every line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut push_line = |line: &str| {
            out.push_str(line);
            out.push_str(OUTPUT_LINE_ENDING);
        };

        push_line(CALENDAR_BEGIN);
        for line in self.wrapper.lines() {
            push_line(line);
        }
        for entry in &self.entries {
            for line in entry.lines() {
                push_line(line);
            }
        }
        for line in self.wrapper.trailing_lines() {
            push_line(line);
        }
        push_line(CALENDAR_END);
        out
    }
}
