//! Registry of diagnostic codes emitted by `mangle-ts`.
//!
//! Each [`Code`] documents where its primary span points and which notes the
//! renamer attaches, so tests and tools can rely on the shape.

use diagnostics::Diagnostic;
use diagnostics::Span;

/// Metadata describing a diagnostic code.
#[derive(Clone, Copy, Debug)]
pub struct Code {
  /// Stable string identifier, e.g. `MG0002`.
  pub id: &'static str,
  pub description: &'static str,
  /// Guidance for where the primary span should be anchored.
  pub primary_span: &'static str,
  pub notes: &'static [&'static str],
}

impl Code {
  pub const fn new(
    id: &'static str,
    description: &'static str,
    primary_span: &'static str,
    notes: &'static [&'static str],
  ) -> Self {
    Code {
      id,
      description,
      primary_span,
      notes,
    }
  }

  pub const fn as_str(&self) -> &'static str {
    self.id
  }

  /// Construct an error diagnostic tagged with this code and its notes.
  pub fn error(&self, message: impl Into<String>, primary: Span) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(self.id, message, primary);
    for note in self.notes {
      diagnostic.push_note(*note);
    }
    diagnostic
  }
}

/// MG0001: The frontend reported a syntax or semantic problem in a
/// program-owned file.
///
/// - Primary span: the location the frontend reported.
/// - Notes: none.
pub const MALFORMED_INPUT: Code = Code::new(
  "MG0001",
  "frontend reported a problem with the input",
  "location reported by the frontend",
  &[],
);

/// MG0002: The left-hand side of a property access has no type information.
///
/// - Primary span: the accessed property name.
/// - Notes: the name is left unchanged.
pub const UNRESOLVABLE_SYMBOL: Code = Code::new(
  "MG0002",
  "symbol information could not be extracted",
  "property name of the access",
  &["the property name was left unchanged"],
);

/// MG0003: A type is coerced both towards program-owned and external types, so
/// its members can neither be renamed nor kept consistently.
///
/// - Primary span: the member name whose rename was being decided.
/// - Labels: secondary label on the first declaration of the type, if known.
/// - Notes: the internal and external cast targets.
pub const CONFLICTING_ELIGIBILITY: Code = Code::new(
  "MG0003",
  "conflicting rename eligibility",
  "member name whose eligibility was queried",
  &[],
);

#[cfg(test)]
mod tests {
  use super::*;
  use diagnostics::FileId;
  use diagnostics::TextRange;

  #[test]
  fn codes_are_unique() {
    let ids = [
      MALFORMED_INPUT.as_str(),
      UNRESOLVABLE_SYMBOL.as_str(),
      CONFLICTING_ELIGIBILITY.as_str(),
    ];
    for (i, id) in ids.iter().enumerate() {
      assert!(!ids[i + 1..].contains(id), "duplicate code {id}");
    }
  }

  #[test]
  fn error_carries_notes() {
    let span = Span::new(FileId(0), TextRange::new(1, 2));
    let diagnostic = UNRESOLVABLE_SYMBOL.error("no type", span);
    assert_eq!(diagnostic.code, "MG0002");
    assert_eq!(diagnostic.notes, ["the property name was left unchanged"]);
  }
}
