use thiserror::Error;

/// The calendar envelope could not be located.
///
/// Line numbers count unfolded logical lines, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("feed has no BEGIN:VCALENDAR line")]
    MissingCalendarBegin,
    #[error("feed has no END:VCALENDAR line")]
    MissingCalendarEnd,
    #[error("last END:VCALENDAR (line {end_line}) precedes first BEGIN:VCALENDAR (line {begin_line})")]
    MisorderedMarkers { begin_line: usize, end_line: usize },
}
