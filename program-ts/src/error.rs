use crate::loc::Loc;
use crate::symbol::SymbolId;
use crate::symbol::TypeId;
use diagnostics::FileId;

/// Reasons a program cannot be assembled from builder or dump input.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
  #[error("{file}: span {loc:?} lies outside the {len} byte source text")]
  SpanOutOfBounds { file: String, loc: Loc, len: usize },

  #[error("{file}: offset {offset} is not on a UTF-8 character boundary")]
  NotCharBoundary { file: String, offset: usize },

  /// The trivia-inclusive span must end where the node ends and start no later.
  #[error("{file}: full span {full:?} does not cover node span {loc:?}")]
  TriviaMismatch { file: String, loc: Loc, full: Loc },

  /// Two sibling spans partially overlap, so no nesting explains them.
  #[error("{file}: span {second:?} partially overlaps {first:?}")]
  Overlap { file: String, first: Loc, second: Loc },

  #[error("{file}: node refers to unknown symbol {symbol:?}")]
  UnknownSymbol { file: String, symbol: SymbolId },

  #[error("{file}: node refers to unknown type {ty:?}")]
  UnknownType { file: String, ty: TypeId },

  #[error("declaration refers to unknown file {file}")]
  UnknownFile { file: FileId },

  #[error("declaration of unknown symbol {symbol:?}")]
  UnknownDeclaredSymbol { symbol: SymbolId },

  #[error("type refers to unknown symbol {symbol:?}")]
  UnknownTypeSymbol { symbol: SymbolId },

  #[error("invalid program dump: {0}")]
  Decode(#[from] serde_json::Error),
}
