use crate::cast::CastGraph;
use program_ts::SymbolId;
use program_ts::TypeChecker;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
  Renameable,
  NotRenameable,
  /// Coerced towards both internal and external types.
  Conflicting,
}

/// A type symbol whose recorded casts disagree about external visibility.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
  pub symbol: SymbolId,
  pub internal: Vec<SymbolId>,
  /// External targets; `None` for targets without a symbol.
  pub external: Vec<Option<SymbolId>>,
}

/// Decides whether members of a type symbol may be renamed, from the symbol's
/// own provenance and the casts recorded for it.
///
/// Only the targets recorded directly for a symbol are consulted. Their own
/// edges are never followed, so cyclic graphs are harmless.
pub struct Eligibility<'a, C: ?Sized> {
  checker: &'a C,
  casts: &'a CastGraph,
}

impl<'a, C: TypeChecker + ?Sized> Eligibility<'a, C> {
  pub fn new(checker: &'a C, casts: &'a CastGraph) -> Self {
    Self { checker, casts }
  }

  pub fn checker(&self) -> &'a C {
    self.checker
  }

  pub fn casts(&self) -> &'a CastGraph {
    self.casts
  }

  /// Unknown symbols count as external.
  pub fn is_external(&self, symbol: Option<SymbolId>) -> bool {
    symbol
      .and_then(|symbol| self.checker.symbol(symbol))
      .map_or(true, |symbol| symbol.is_external())
  }

  pub fn verdict(&self, symbol: SymbolId) -> Verdict {
    match self.classify(symbol) {
      Ok(true) => Verdict::Renameable,
      Ok(false) => Verdict::NotRenameable,
      Err(_) => Verdict::Conflicting,
    }
  }

  pub fn is_renameable(&self, symbol: SymbolId) -> Result<bool, Conflict> {
    let result = self.classify(symbol);
    debug!(
      symbol = self.checker.symbol_name(symbol),
      renameable = ?result.as_ref().ok(),
      "eligibility"
    );
    result
  }

  fn classify(&self, symbol: SymbolId) -> Result<bool, Conflict> {
    if self.is_external(Some(symbol)) {
      return Ok(false);
    }
    let targets = self.casts.targets(symbol);
    if targets.is_empty() {
      return Ok(true);
    }
    let (external, internal): (Vec<_>, Vec<_>) = targets
      .iter()
      .copied()
      .partition(|&target| self.is_external(target));
    match (internal.is_empty(), external.is_empty()) {
      (_, true) => Ok(true),
      (true, false) => Ok(false),
      (false, false) => Err(Conflict {
        symbol,
        internal: internal.into_iter().flatten().collect(),
        external,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use program_ts::FileBuilder;
  use program_ts::Loc;
  use program_ts::Program;
  use program_ts::ProgramBuilder;
  use program_ts::SymbolKind;

  struct Fixture {
    program: Program,
    internal: SymbolId,
    other: SymbolId,
    external: SymbolId,
  }

  fn fixture() -> Fixture {
    let mut b = ProgramBuilder::new();
    let main = b.file(FileBuilder::new("main.ts", "class A {} class B {}"));
    let lib = b.file(FileBuilder::new("lib.d.ts", "interface E {}").external());
    let internal = b.symbol("A", SymbolKind::Type);
    let other = b.symbol("B", SymbolKind::Type);
    let external = b.symbol("E", SymbolKind::Type);
    b.declare(internal, main, Loc(6, 7));
    b.declare(other, main, Loc(17, 18));
    b.declare(external, lib, Loc(10, 11));
    Fixture {
      program: b.build().unwrap(),
      internal,
      other,
      external,
    }
  }

  #[test]
  fn unconstrained_internal_symbols_are_renameable() {
    let f = fixture();
    let casts = CastGraph::new();
    let eligibility = Eligibility::new(&f.program, &casts);
    assert_eq!(eligibility.is_renameable(f.internal), Ok(true));
    assert_eq!(eligibility.is_renameable(f.external), Ok(false));
    assert_eq!(eligibility.verdict(SymbolId(42)), Verdict::NotRenameable);
  }

  #[test]
  fn unanimous_targets_decide() {
    let f = fixture();
    let mut casts = CastGraph::new();
    casts.record(f.internal, Some(f.other));
    casts.record(f.internal, Some(f.internal));
    casts.record(f.other, Some(f.external));
    casts.record(f.other, None);
    let eligibility = Eligibility::new(&f.program, &casts);
    assert_eq!(eligibility.verdict(f.internal), Verdict::Renameable);
    assert_eq!(eligibility.verdict(f.other), Verdict::NotRenameable);
  }

  #[test]
  fn mixed_targets_conflict() {
    let f = fixture();
    let mut casts = CastGraph::new();
    casts.record(f.internal, Some(f.other));
    casts.record(f.internal, Some(f.external));
    let eligibility = Eligibility::new(&f.program, &casts);
    assert_eq!(
      eligibility.is_renameable(f.internal),
      Err(Conflict {
        symbol: f.internal,
        internal: vec![f.other],
        external: vec![Some(f.external)],
      })
    );
    assert_eq!(eligibility.verdict(f.internal), Verdict::Conflicting);
  }

  #[test]
  fn lookups_are_one_hop() {
    let f = fixture();
    let mut casts = CastGraph::new();
    // `A` only reaches `E` through `B`.
    casts.record(f.internal, Some(f.other));
    casts.record(f.other, Some(f.external));
    casts.record(f.other, Some(f.internal));
    let eligibility = Eligibility::new(&f.program, &casts);
    assert_eq!(eligibility.verdict(f.internal), Verdict::Renameable);
    assert_eq!(eligibility.verdict(f.other), Verdict::Conflicting);
  }
}
