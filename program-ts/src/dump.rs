//! JSON interchange format for programs produced by an external frontend.
//!
//! A dump lists symbols and types by index, then every file with its text and a
//! flat list of annotated nodes. Nesting is recovered from spans the same way
//! [`ProgramBuilder`] does it, so a frontend only needs to emit spans.

use crate::build::FileBuilder;
use crate::build::ProgramBuilder;
use crate::error::BuildError;
use crate::loc::Loc;
use crate::program::Program;
use crate::symbol::Signature;
use crate::symbol::SymbolId;
use crate::symbol::SymbolKind;
use crate::symbol::TypeId;
use crate::syntax::Field;
use crate::syntax::SyntaxKind;
use diagnostics::FileId;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgramDump {
  #[serde(default)]
  pub symbols: Vec<SymbolDump>,
  #[serde(default)]
  pub types: Vec<TypeDump>,
  pub files: Vec<FileDump>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolDump {
  pub name: String,
  pub kind: SymbolKind,
  #[serde(default)]
  pub declarations: Vec<DeclarationDump>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub signature: Option<Signature>,
}

/// `file` is the index of the declaring file in [`ProgramDump::files`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeclarationDump {
  pub file: u32,
  pub start: usize,
  pub end: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDump {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub symbol: Option<SymbolId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileDump {
  pub name: String,
  pub text: String,
  #[serde(default)]
  pub external: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub diagnostics: Vec<DiagnosticDump>,
  #[serde(default)]
  pub nodes: Vec<NodeDump>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnosticDump {
  pub start: usize,
  pub end: usize,
  pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDump {
  pub kind: SyntaxKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field: Option<Field>,
  pub start: usize,
  pub end: usize,
  /// Start of leading trivia; defaults to `start`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_start: Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub symbol: Option<SymbolId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ty: Option<TypeId>,
}

impl ProgramDump {
  pub fn from_json(json: &str) -> Result<Self, BuildError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn into_program(self) -> Result<Program, BuildError> {
    let mut b = ProgramBuilder::new();

    for symbol in self.symbols {
      let id = b.symbol(symbol.name, symbol.kind);
      for decl in symbol.declarations {
        b.declare(id, FileId(decl.file), Loc(decl.start, decl.end));
      }
      if let Some(signature) = symbol.signature {
        b.signature(id, signature);
      }
    }

    for ty in self.types {
      b.ty(ty.name, ty.symbol);
    }

    for file in self.files {
      let mut builder = FileBuilder::new(file.name, file.text);
      if file.external {
        builder = builder.external();
      }
      for diag in file.diagnostics {
        builder.diagnostic(Loc(diag.start, diag.end), diag.message);
      }
      for node in file.nodes {
        let spec = builder.node(node.kind, Loc(node.start, node.end));
        if let Some(field) = node.field {
          spec.field(field);
        }
        if let Some(full_start) = node.full_start {
          spec.full(Loc(full_start, node.end));
        }
        if let Some(symbol) = node.symbol {
          spec.symbol(symbol);
        }
        if let Some(ty) = node.ty {
          spec.ty(ty);
        }
      }
      b.file(builder);
    }

    b.build()
  }
}

impl Program {
  /// Decodes and assembles a program from its JSON dump.
  pub fn from_json(json: &str) -> Result<Program, BuildError> {
    ProgramDump::from_json(json)?.into_program()
  }
}
