use std::sync::Once;

use feed_core::{normalize_and_filter, parse_feed, FilterRule, StructuralError};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

const HEADER: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Uni//Stundenplan//DE\r\nCALSCALE:GREGORIAN\r\nMETHOD:PUBLISH\r\n";

fn event(uid: u32, summary: &str) -> String {
    format!(
        "BEGIN:VEVENT\r\nUID:{uid}@uni\r\nDTSTART:20241014T081500Z\r\nSUMMARY:{summary}\r\nLOCATION:H{uid}\r\nEND:VEVENT\r\n"
    )
}

fn feed(events: &[String]) -> String {
    let mut out = HEADER.to_string();
    for e in events {
        out.push_str(e);
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

#[test]
fn blocked_middle_entry_is_removed_and_order_kept() {
    init_logging();
    let raw = feed(&[
        event(1, "Analysis I"),
        event(2, "Hochschulsport Volleyball"),
        event(3, "Lineare Algebra"),
    ]);
    let rules = FilterRule::new(["hochschulsport"]);

    let cleaned = normalize_and_filter(&raw, &rules).unwrap();

    let uids: Vec<&str> = cleaned.entries.iter().map(|e| e.lines()[1].as_str()).collect();
    assert_eq!(uids, vec!["UID:1@uni", "UID:3@uni"]);
    assert_eq!(cleaned.report.entries_in, 3);
    assert_eq!(cleaned.report.entries_kept, 2);
    assert_eq!(cleaned.report.excluded.len(), 1);
    assert_eq!(
        cleaned.report.excluded[0].title.as_deref(),
        Some("Hochschulsport Volleyball")
    );
    assert_eq!(cleaned.report.excluded[0].phrase, "hochschulsport");
}

#[test]
fn rendered_output_is_exact_crlf_feed() {
    init_logging();
    let raw = feed(&[event(1, "Analysis I"), event(2, "Chor")]).replace("\r\n", "\n");
    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["chor"])).unwrap();

    let expected = format!("{HEADER}{}END:VCALENDAR\r\n", event(1, "Analysis I"));
    assert_eq!(cleaned.render(), expected);
}

#[test]
fn feed_without_entries_renders_header_and_single_end() {
    init_logging();
    let raw = format!("{HEADER}END:VCALENDAR\r\n");
    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["x"])).unwrap();

    assert!(cleaned.entries.is_empty());
    assert_eq!(cleaned.render(), raw);
}

#[test]
fn filtering_everything_is_valid_output() {
    init_logging();
    let raw = feed(&[event(1, "Sport A"), event(2, "Sport B")]);
    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["SPORT"])).unwrap();

    assert_eq!(cleaned.report.entries_kept, 0);
    assert_eq!(cleaned.render(), format!("{HEADER}END:VCALENDAR\r\n"));
}

#[test]
fn missing_end_marker_is_structural_error() {
    init_logging();
    let raw = format!("{HEADER}{}", event(1, "Analysis I"));
    let err = normalize_and_filter(&raw, &FilterRule::default()).unwrap_err();
    assert_eq!(err, StructuralError::MissingCalendarEnd);
}

#[test]
fn missing_begin_marker_is_structural_error() {
    init_logging();
    let raw = format!("VERSION:2.0\r\n{}END:VCALENDAR\r\n", event(1, "Analysis I"));
    let err = parse_feed(&raw).unwrap_err();
    assert_eq!(err, StructuralError::MissingCalendarBegin);
}

#[test]
fn end_before_begin_is_structural_error() {
    init_logging();
    let raw = "END:VCALENDAR\r\nBEGIN:VCALENDAR\r\nVERSION:2.0\r\n";
    let err = parse_feed(raw).unwrap_err();
    assert_eq!(
        err,
        StructuralError::MisorderedMarkers {
            begin_line: 2,
            end_line: 1
        }
    );
}

#[test]
fn phrase_split_by_folding_is_still_detected() {
    init_logging();
    let folded = "BEGIN:VEVENT\r\nUID:9@uni\r\nSUMMARY:Hochschul\r\n sport Schwimmen\r\nEND:VEVENT\r\n";
    let raw = feed(&[event(1, "Analysis I"), folded.to_string()]);

    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["Hochschulsport"])).unwrap();

    assert_eq!(cleaned.report.entries_kept, 1);
    assert_eq!(
        cleaned.report.excluded[0].title.as_deref(),
        Some("Hochschulsport Schwimmen")
    );
}

#[test]
fn folded_marker_token_is_not_a_boundary() {
    init_logging();
    let tricky = "BEGIN:VEVENT\r\nUID:5@uni\r\nDESCRIPTION:see\r\n \r\n BEGIN:VEVENT in the notes\r\nEND:VEVENT\r\n";
    let raw = feed(&[tricky.to_string(), event(6, "Analysis I")]);

    let cleaned = normalize_and_filter(&raw, &FilterRule::default()).unwrap();

    assert_eq!(cleaned.entries.len(), 2);
    assert_eq!(cleaned.report.corrupt_entries, 0);
    assert_eq!(
        cleaned.entries[0].lines()[2],
        "DESCRIPTION:seeBEGIN:VEVENT in the notes"
    );
}

#[test]
fn filter_breadth_covers_every_field() {
    init_logging();
    let raw = feed(&[event(1, "Analysis I")]);
    // LOCATION:H1 is not part of the title but still matches.
    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["h1"])).unwrap();
    assert!(cleaned.entries.is_empty());
}

#[test]
fn duplicated_envelope_collapses_to_one_pair() {
    init_logging();
    let raw = format!(
        "{HEADER}BEGIN:VCALENDAR\r\n{}END:VCALENDAR\r\nBEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}END:VCALENDAR\r\nX-TRAILER:1\r\n",
        event(1, "Analysis I"),
        event(2, "Lineare Algebra")
    );

    let cleaned = normalize_and_filter(&raw, &FilterRule::default()).unwrap();
    let rendered = cleaned.render();

    assert_eq!(rendered.matches("BEGIN:VCALENDAR").count(), 1);
    assert_eq!(rendered.matches("END:VCALENDAR").count(), 1);
    assert!(rendered.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(rendered.ends_with("END:VCALENDAR\r\n"));
    assert!(!rendered.contains("X-TRAILER"));
    assert_eq!(cleaned.entries.len(), 2);
    assert_eq!(cleaned.report.collapsed_markers, 3);
    assert_eq!(cleaned.report.stray_lines, 0);
    // The second envelope's own properties stay with the calendar.
    assert_eq!(cleaned.wrapper.trailing_lines(), ["VERSION:2.0".to_string()]);
}

#[test]
fn calendar_lines_after_last_entry_survive() {
    init_logging();
    let raw = format!(
        "{HEADER}{}{}BEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\nX-WR-CALNAME:Plan\r\nEND:VCALENDAR\r\n",
        event(1, "Analysis I"),
        event(2, "Hochschulsport Yoga")
    );

    let cleaned = normalize_and_filter(&raw, &FilterRule::new(["hochschulsport"])).unwrap();
    let rendered = cleaned.render();

    assert!(rendered.ends_with(
        "END:VEVENT\r\nBEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\nX-WR-CALNAME:Plan\r\nEND:VCALENDAR\r\n"
    ));
    assert_eq!(rendered.matches("END:VCALENDAR").count(), 1);
    assert!(!rendered.contains("Hochschulsport"));
    assert_eq!(cleaned.report.stray_lines, 0);
}

#[test]
fn component_between_entries_is_kept_after_entries() {
    init_logging();
    let raw = feed(&[
        event(1, "Analysis I"),
        "BEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\nEND:VEVENT\r\n".to_string(),
        event(2, "Lineare Algebra"),
    ]);

    let cleaned = normalize_and_filter(&raw, &FilterRule::default()).unwrap();

    assert_eq!(cleaned.entries.len(), 2);
    assert_eq!(
        cleaned.wrapper.trailing_lines(),
        [
            "BEGIN:VTIMEZONE".to_string(),
            "TZID:Europe/Berlin".to_string(),
            "END:VTIMEZONE".to_string(),
        ]
    );
    assert_eq!(cleaned.report.stray_lines, 1);
    let rendered = cleaned.render();
    assert!(rendered.contains("END:VEVENT\r\nBEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\nEND:VCALENDAR\r\n"));
}

#[test]
fn corrupt_entry_is_dropped_without_failing_feed() {
    init_logging();
    let broken = "BEGIN:VEVENT\r\nUID:7@uni\r\nSUMMARY:half written\r\n";
    let raw = feed(&[event(1, "Analysis I"), broken.to_string(), event(3, "Lineare Algebra")]);

    let cleaned = normalize_and_filter(&raw, &FilterRule::default()).unwrap();

    assert_eq!(cleaned.report.corrupt_entries, 1);
    assert_eq!(cleaned.entries.len(), 2);
    assert!(!cleaned.render().contains("half written"));
}

#[test]
fn header_keeps_timezone_components() {
    init_logging();
    let raw = format!(
        "{HEADER}BEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\n{}END:VCALENDAR\r\n",
        event(1, "Analysis I")
    );
    let cleaned = normalize_and_filter(&raw, &FilterRule::default()).unwrap();
    assert!(cleaned
        .wrapper
        .lines()
        .iter()
        .any(|line| line == "TZID:Europe/Berlin"));
}
