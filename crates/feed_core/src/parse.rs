use crate::error::StructuralError;
use crate::marker::Marker;
use crate::text::unfolded_lines;
use crate::types::{CalendarWrapper, Entry, ParsedFeed};

/// Unfold `raw`, locate the calendar envelope and split it into entries.
///
/// Lines before the first `BEGIN:VCALENDAR` and after the last `END:VCALENDAR`
/// are discarded. A feed without any `BEGIN:VEVENT` inside the envelope parses
/// to zero entries.
pub fn parse_feed(raw: &str) -> Result<ParsedFeed, StructuralError> {
    let lines = unfolded_lines(raw);
    let markers: Vec<Option<Marker>> = lines.iter().map(|line| Marker::detect(line)).collect();

    let begin = markers
        .iter()
        .position(|m| *m == Some(Marker::CalendarBegin))
        .ok_or(StructuralError::MissingCalendarBegin)?;
    let end = markers
        .iter()
        .rposition(|m| *m == Some(Marker::CalendarEnd))
        .ok_or(StructuralError::MissingCalendarEnd)?;
    if end < begin {
        return Err(StructuralError::MisorderedMarkers {
            begin_line: begin + 1,
            end_line: end + 1,
        });
    }

    let body = &lines[begin + 1..end];
    let body_markers = &markers[begin + 1..end];
    let first_entry = body_markers
        .iter()
        .position(|m| *m == Some(Marker::EntryBegin))
        .unwrap_or(body.len());

    let mut header = Vec::with_capacity(first_entry);
    let mut collapsed_markers = 0;
    let mut stray_lines = 0;
    for (line, marker) in body[..first_entry].iter().zip(&body_markers[..first_entry]) {
        match marker {
            Some(m) if m.is_calendar() => collapsed_markers += 1,
            // An END:VEVENT before any entry closes nothing.
            Some(Marker::EntryEnd) => stray_lines += 1,
            _ => header.push(line.clone()),
        }
    }

    let split = split_entries(&body[first_entry..]);

    Ok(ParsedFeed {
        wrapper: CalendarWrapper::new(header, split.wrapper_lines),
        entries: split.entries,
        corrupt_entries: split.corrupt_entries,
        stray_lines: stray_lines + split.stray_lines,
        collapsed_markers: collapsed_markers + split.collapsed_markers,
    })
}

/// Result of splitting an entries region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitEntries {
    pub entries: Vec<Entry>,
    /// Calendar-level lines found after an entry's `END:VEVENT`, such as a
    /// `VTIMEZONE` placed after the events. Kept in source order.
    pub wrapper_lines: Vec<String>,
    pub corrupt_entries: usize,
    pub stray_lines: usize,
    pub collapsed_markers: usize,
}

/// Split unfolded lines at every `BEGIN:VEVENT`, keeping the marker with the
/// entry it opens.
///
/// Each fragment must reach an `END:VEVENT` before any calendar marker,
/// otherwise it is counted as corrupt and dropped. Lines after an entry's
/// `END:VEVENT` belong to the calendar, not to an entry, and are returned as
/// wrapper lines; only duplicate envelope markers and unmatched `END:VEVENT`
/// lines among them are dropped. Lines before the first `BEGIN:VEVENT` are
/// discarded.
pub fn split_entries(lines: &[String]) -> SplitEntries {
    let mut fragments: Vec<&[String]> = Vec::new();
    let mut leading_end = lines.len();
    let mut start: Option<usize> = None;
    for (idx, line) in lines.iter().enumerate() {
        if Marker::detect(line) == Some(Marker::EntryBegin) {
            match start {
                Some(from) => fragments.push(&lines[from..idx]),
                None => leading_end = idx,
            }
            start = Some(idx);
        }
    }
    if let Some(from) = start {
        fragments.push(&lines[from..]);
    }

    let mut split = SplitEntries::default();
    for line in &lines[..leading_end] {
        match Marker::detect(line) {
            Some(m) if m.is_calendar() => split.collapsed_markers += 1,
            _ => split.stray_lines += 1,
        }
    }

    for fragment in fragments {
        let close = fragment
            .iter()
            .map(|line| Marker::detect(line))
            .position(|m| {
                matches!(
                    m,
                    Some(Marker::EntryEnd | Marker::CalendarBegin | Marker::CalendarEnd)
                )
            });
        match close {
            Some(idx) if Marker::detect(&fragment[idx]) == Some(Marker::EntryEnd) => {
                split.entries.push(Entry::new(fragment[..=idx].to_vec()));
                keep_wrapper_lines(&fragment[idx + 1..], &mut split);
            }
            _ => {
                split.corrupt_entries += 1;
                // The fragment is gone, but duplicate envelope markers in it
                // still count as collapsed.
                let markers = fragment
                    .iter()
                    .filter(|line| Marker::detect(line).is_some_and(Marker::is_calendar))
                    .count();
                split.collapsed_markers += markers;
            }
        }
    }
    split
}

fn keep_wrapper_lines(lines: &[String], split: &mut SplitEntries) {
    for line in lines {
        match Marker::detect(line) {
            Some(m) if m.is_calendar() => split.collapsed_markers += 1,
            Some(Marker::EntryEnd) => split.stray_lines += 1,
            _ => split.wrapper_lines.push(line.clone()),
        }
    }
}
