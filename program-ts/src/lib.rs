//! Syntax trees, symbols and types of a TypeScript program, as handed to the
//! property renamer by a frontend.
//!
//! Trees are arenas addressed by [`NodeId`]; every node knows its kind, its role
//! in its parent ([`Field`]) and its span both with and without leading trivia.
//! Semantic facts (the symbol a node names, the type it has) are optional
//! annotations and are queried through the [`TypeChecker`] trait.
//!
//! Programs are assembled with [`ProgramBuilder`], which infers nesting from
//! spans, or decoded from a JSON [`ProgramDump`].

pub mod build;
pub mod dump;
pub mod error;
pub mod loc;
pub mod program;
pub mod symbol;
pub mod syntax;

pub use build::FileBuilder;
pub use build::NodeSpec;
pub use build::ProgramBuilder;
pub use dump::ProgramDump;
pub use error::BuildError;
pub use loc::Loc;
pub use program::FrontendDiagnostic;
pub use program::Program;
pub use program::SourceFile;
pub use program::SourceFiles;
pub use program::TypeChecker;
pub use symbol::Declaration;
pub use symbol::Signature;
pub use symbol::Symbol;
pub use symbol::SymbolId;
pub use symbol::SymbolKind;
pub use symbol::SymbolTable;
pub use symbol::Type;
pub use symbol::TypeId;
pub use syntax::Field;
pub use syntax::NodeId;
pub use syntax::SyntaxKind;
pub use syntax::SyntaxNode;
pub use syntax::SyntaxTree;
