/// Options controlling a rename run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MangleOptions {
  /// Abort on the first recoverable diagnostic instead of collecting them.
  /// Conflicting eligibility aborts regardless.
  pub fail_fast: bool,
}

impl MangleOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
    self.fail_fast = fail_fast;
    self
  }
}
