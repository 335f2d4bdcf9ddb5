pub const CALENDAR_BEGIN: &str = "BEGIN:VCALENDAR";
pub const CALENDAR_END: &str = "END:VCALENDAR";
pub const ENTRY_BEGIN: &str = "BEGIN:VEVENT";
pub const ENTRY_END: &str = "END:VEVENT";

/// Structural token recognised on a whole logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    CalendarBegin,
    CalendarEnd,
    EntryBegin,
    EntryEnd,
}

impl Marker {
    /// Exact literal match of the whole line; property names are case-insensitive.
    pub(crate) fn detect(line: &str) -> Option<Self> {
        let token = line.trim();
        [
            (CALENDAR_BEGIN, Marker::CalendarBegin),
            (CALENDAR_END, Marker::CalendarEnd),
            (ENTRY_BEGIN, Marker::EntryBegin),
            (ENTRY_END, Marker::EntryEnd),
        ]
        .into_iter()
        .find(|(literal, _)| literal.eq_ignore_ascii_case(token))
        .map(|(_, marker)| marker)
    }

    pub(crate) fn is_calendar(self) -> bool {
        matches!(self, Marker::CalendarBegin | Marker::CalendarEnd)
    }
}
