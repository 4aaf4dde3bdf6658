use diagnostics::Diagnostic;
use program_ts::SymbolId;

/// Reasons a rename run stops without output.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MangleError {
  /// The frontend reported problems in program-owned files. `report` lists one
  /// `file:line:column: message` line per diagnostic.
  #[error("input has {} error(s):\n{report}", diagnostics.len())]
  MalformedInput {
    diagnostics: Vec<Diagnostic>,
    report: String,
  },

  /// A property access without type information, under fail-fast.
  #[error("{}", .0.message)]
  Unresolvable(Diagnostic),

  /// Members of `symbol` can be neither renamed nor kept consistently.
  #[error("{}", .diagnostic.message)]
  Conflict {
    symbol: SymbolId,
    diagnostic: Diagnostic,
  },
}

impl MangleError {
  pub fn diagnostics(&self) -> &[Diagnostic] {
    match self {
      MangleError::MalformedInput { diagnostics, .. } => diagnostics,
      MangleError::Unresolvable(diagnostic) => std::slice::from_ref(diagnostic),
      MangleError::Conflict { diagnostic, .. } => std::slice::from_ref(diagnostic),
    }
  }
}
