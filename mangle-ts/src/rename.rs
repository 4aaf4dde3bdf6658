use crate::names::NameGenerator;
use ahash::HashMap;
use itertools::Itertools;

/// Program-wide table from original property names to generated names.
///
/// Names are assigned on first sight and never change afterwards, so every
/// occurrence of an original name maps to the same output within one run.
#[derive(Clone, Debug, Default)]
pub struct RenameState {
  generator: NameGenerator,
  names: HashMap<String, String>,
}

impl RenameState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Generated name for `original`, assigning the next one if unseen.
  pub fn rename(&mut self, original: &str) -> &str {
    if !self.names.contains_key(original) {
      let name = self.generator.next_name();
      self.names.insert(original.to_string(), name);
    }
    self.names[original].as_str()
  }

  pub fn get(&self, original: &str) -> Option<&str> {
    self.names.get(original).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Last generated code, or the empty string before the first assignment.
  pub fn last_generated(&self) -> &str {
    self.generator.last()
  }

  /// All assignments ordered by original name.
  pub fn renames(&self) -> Vec<(&str, &str)> {
    self
      .names
      .iter()
      .map(|(original, renamed)| (original.as_str(), renamed.as_str()))
      .sorted()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_name_maps_to_same_output() {
    let mut state = RenameState::new();
    assert_eq!(state.rename("bar"), "$");
    assert_eq!(state.rename("baz"), "_");
    assert_eq!(state.rename("bar"), "$");
    assert_eq!(state.len(), 2);
    assert_eq!(state.last_generated(), "_");
    assert_eq!(state.get("qux"), None);
  }

  #[test]
  fn renames_are_sorted_by_original() {
    let mut state = RenameState::new();
    for name in ["zeta", "alpha", "mid"] {
      state.rename(name);
    }
    assert_eq!(
      state.renames(),
      [("alpha", "_"), ("mid", "a"), ("zeta", "$")]
    );
  }
}
