use diagnostics::FileId;
use diagnostics::Span;
use diagnostics::TextRange;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;

/// A location within a source file expressed as UTF-8 byte offsets, half-open.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn contains(&self, other: Loc) -> bool {
    self.0 <= other.0 && other.1 <= self.1
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  /// Converts this `Loc` into a [`TextRange`], clamping to `u32` on overflow.
  pub fn as_range(&self) -> TextRange {
    TextRange::saturating(self.0, self.1)
  }

  pub fn to_span(&self, file: FileId) -> Span {
    Span::new(file, self.as_range())
  }
}

impl From<Loc> for TextRange {
  fn from(value: Loc) -> Self {
    value.as_range()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extend_covers_both() {
    let mut loc = Loc(4, 6);
    loc.extend(Loc(1, 5));
    assert_eq!(loc, Loc(1, 6));
    assert_eq!(loc.len(), 5);
  }

  #[test]
  fn containment_is_inclusive_of_bounds() {
    assert!(Loc(0, 10).contains(Loc(0, 10)));
    assert!(Loc(0, 10).contains(Loc(3, 3)));
    assert!(!Loc(2, 10).contains(Loc(1, 4)));
  }

  #[test]
  fn converts_to_span() {
    let span = Loc(2, 4).to_span(FileId(7));
    assert_eq!(span.file, FileId(7));
    assert_eq!(span.range, TextRange::new(2, 4));
  }
}
