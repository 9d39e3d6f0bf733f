use super::*;
use pretty_assertions::assert_eq;
use rsig_ir::{SourceId, Span};

fn at(start: u32) -> Location {
    Location::new(SourceId(1), Span::new(start, start + 3))
}

#[test]
fn test_builder_pattern() {
    let diag = Diagnostic::error(ErrorCode::E3001)
        .with_message("duplicate method `foo`")
        .with_label(at(10), "defined again here")
        .with_secondary_label(at(2), "first defined here")
        .with_note("methods in one declaration body must be unique");

    assert_eq!(diag.code, ErrorCode::E3001);
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_location(), Some(at(10)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_display() {
    let diag = Diagnostic::error(ErrorCode::E2003).with_message("cyclic ancestry");
    assert_eq!(diag.to_string(), "error[E2003]: cyclic ancestry");

    let warn = Diagnostic::warning(ErrorCode::E4002).with_message("w");
    assert_eq!(warn.to_string(), "warning[E4002]: w");
}

#[test]
fn test_no_primary_label() {
    let diag =
        Diagnostic::error(ErrorCode::E1001).with_secondary_label(at(0), "referenced from here");
    assert_eq!(diag.primary_location(), None);
}
