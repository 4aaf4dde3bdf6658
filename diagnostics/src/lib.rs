//! Shared diagnostics model and rendering utilities.
//!
//! Diagnostics are plain data: a stable code, a severity, a message and a
//! primary [`Span`], optionally with secondary labels and free-form notes.
//! Rendering lives in [`render`] and only needs a [`render::SourceProvider`]
//! to map a [`FileId`] back to a name and text.
//!
//! ```
//! use diagnostics::render::{render_short, SourceProvider};
//! use diagnostics::{Diagnostic, FileId, Span, TextRange};
//!
//! struct Main;
//!
//! impl SourceProvider for Main {
//!   fn file_name(&self, _: FileId) -> Option<&str> {
//!     Some("main.ts")
//!   }
//!
//!   fn file_text(&self, _: FileId) -> Option<&str> {
//!     Some("let x = 1;\nx.foo;")
//!   }
//! }
//!
//! let diag = Diagnostic::error("TEST0001", "no foo here", Span::new(FileId(0), TextRange::new(13, 16)));
//! assert_eq!(render_short(&Main, &diag), "main.ts:2:3: no foo here");
//! ```

pub mod render;

use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// A stable identifier for a file in a program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl Display for FileId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A half-open byte range in a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct TextRange {
  pub start: u32,
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  /// Builds a range from `usize` offsets, saturating at `u32::MAX`.
  pub fn saturating(start: usize, end: usize) -> Self {
    Self {
      start: saturating_to_u32(start),
      end: saturating_to_u32(end),
    }
  }
}

/// A span across a specific file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Span {
  pub file: FileId,
  pub range: TextRange,
}

impl Span {
  pub const fn new(file: FileId, range: TextRange) -> Self {
    Self { file, range }
  }
}

/// Diagnostic severity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A label attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Label {
  pub span: Span,
  pub message: String,
  pub is_primary: bool,
}

impl Label {
  pub(crate) fn primary(span: Span, message: impl Into<String>) -> Self {
    Self {
      span,
      message: message.into(),
      is_primary: true,
    }
  }

  pub fn secondary(span: Span, message: impl Into<String>) -> Self {
    Self {
      span,
      message: message.into(),
      is_primary: false,
    }
  }
}

/// A user-facing diagnostic with optional labels and notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: &'static str,
  pub severity: Severity,
  pub message: String,
  pub primary: Span,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
}

impl Diagnostic {
  fn new(
    severity: Severity,
    code: &'static str,
    message: impl Into<String>,
    primary: Span,
  ) -> Self {
    Self {
      code,
      severity,
      message: message.into(),
      primary,
      labels: Vec::new(),
      notes: Vec::new(),
    }
  }

  pub fn error(code: &'static str, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Error, code, message, primary)
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn push_note(&mut self, note: impl Into<String>) {
    self.notes.push(note.into());
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}

/// Sorts diagnostics by file, start offset, code and message so output is
/// independent of discovery order.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
  diagnostics.sort_by(|a, b| {
    a.primary
      .file
      .cmp(&b.primary.file)
      .then(a.primary.range.start.cmp(&b.primary.range.start))
      .then(a.primary.range.end.cmp(&b.primary.range.end))
      .then(a.code.cmp(b.code))
      .then(a.message.cmp(&b.message))
  });
}

fn saturating_to_u32(value: usize) -> u32 {
  u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn span(file: u32, start: u32, end: u32) -> Span {
    Span::new(FileId(file), TextRange::new(start, end))
  }

  #[test]
  fn saturating_range_clamps_large_offsets() {
    let range = TextRange::saturating(3, usize::MAX);
    assert_eq!(range.start, 3);
    assert_eq!(range.end, u32::MAX);
    assert_eq!(TextRange::saturating(4, 4), TextRange::new(4, 4));
  }

  #[test]
  fn sorting_is_stable_across_discovery_order() {
    let mut diagnostics = vec![
      Diagnostic::error("B0002", "later", span(1, 0, 1)),
      Diagnostic::error("A0001", "second", span(0, 8, 9)),
      Diagnostic::error("A0001", "first", span(0, 2, 3)),
    ];
    sort_diagnostics(&mut diagnostics);
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, ["first", "second", "later"]);
  }

  #[test]
  fn builder_methods_accumulate() {
    let mut diagnostic = Diagnostic::error("E0002", "careful", span(0, 0, 1))
      .with_label(Label::secondary(span(0, 4, 5), "related"));
    diagnostic.push_note("first note");
    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.labels.len(), 1);
    assert!(!diagnostic.labels[0].is_primary);
    assert_eq!(diagnostic.notes, ["first note"]);
  }

  #[test]
  fn serializes_severity_in_lowercase() {
    let diagnostic = Diagnostic::error("E0001", "boom", span(2, 1, 2));
    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["severity"], "error");
    assert_eq!(json["code"], "E0001");
    assert_eq!(json["primary"]["range"]["start"], 1);
  }
}
