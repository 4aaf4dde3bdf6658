use crate::loc::Loc;
use crate::symbol::Signature;
use crate::symbol::Symbol;
use crate::symbol::SymbolId;
use crate::symbol::SymbolTable;
use crate::symbol::Type;
use crate::symbol::TypeId;
use crate::syntax::NodeId;
use crate::syntax::SyntaxTree;
use diagnostics::render::SourceProvider;
use diagnostics::FileId;
use serde::Deserialize;
use serde::Serialize;

/// A syntax or semantic problem reported by the frontend for a file.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FrontendDiagnostic {
  pub loc: Loc,
  pub message: String,
}

#[derive(Clone, Debug)]
pub struct SourceFile {
  pub id: FileId,
  pub name: String,
  pub text: String,
  /// Interface-only source whose text is never rewritten.
  pub external: bool,
  pub tree: SyntaxTree,
  pub diagnostics: Vec<FrontendDiagnostic>,
}

impl SourceFile {
  pub fn text_at(&self, loc: Loc) -> &str {
    &self.text[loc.0..loc.1]
  }

  /// Source text of a node, without leading trivia.
  pub fn text_of(&self, node: NodeId) -> &str {
    self.text_at(self.tree.node(node).loc)
  }
}

/// Type resolution facility supplied by the frontend.
///
/// All lookups are by node; a frontend that cannot answer returns `None` and
/// the renamer treats the answer conservatively.
pub trait TypeChecker {
  fn symbol_of(&self, file: &SourceFile, node: NodeId) -> Option<SymbolId>;
  fn type_of(&self, file: &SourceFile, node: NodeId) -> Option<TypeId>;
  fn type_symbol(&self, ty: TypeId) -> Option<SymbolId>;
  fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

  /// Symbol of the type of `node`. `None` both when the node has no type and
  /// when the type has no symbol.
  fn type_symbol_of(&self, file: &SourceFile, node: NodeId) -> Option<SymbolId> {
    self.type_of(file, node).and_then(|ty| self.type_symbol(ty))
  }

  fn signature_of(&self, symbol: SymbolId) -> Option<&Signature> {
    self.symbol(symbol).and_then(|sym| sym.signature.as_ref())
  }

  fn symbol_name(&self, symbol: SymbolId) -> &str {
    self
      .symbol(symbol)
      .map(|sym| sym.name.as_str())
      .unwrap_or("<unknown symbol>")
  }
}

/// A whole program: every source file plus the symbol and type tables the
/// frontend computed for them.
#[derive(Clone, Debug, Default)]
pub struct Program {
  pub(crate) files: Vec<SourceFile>,
  pub(crate) table: SymbolTable,
}

impl Program {
  pub fn files(&self) -> &[SourceFile] {
    &self.files
  }

  pub fn file(&self, id: FileId) -> Option<&SourceFile> {
    self.files.get(id.0 as usize)
  }

  pub fn file_by_name(&self, name: &str) -> Option<&SourceFile> {
    self.files.iter().find(|file| file.name == name)
  }

  pub fn table(&self) -> &SymbolTable {
    &self.table
  }

  pub fn ty(&self, id: TypeId) -> Option<&Type> {
    self.table.ty(id)
  }
}

impl TypeChecker for Program {
  fn symbol_of(&self, file: &SourceFile, node: NodeId) -> Option<SymbolId> {
    file.tree.get(node).and_then(|n| n.symbol)
  }

  fn type_of(&self, file: &SourceFile, node: NodeId) -> Option<TypeId> {
    file.tree.get(node).and_then(|n| n.ty)
  }

  fn type_symbol(&self, ty: TypeId) -> Option<SymbolId> {
    self.table.ty(ty).and_then(|t| t.symbol)
  }

  fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
    self.table.symbol(id)
  }
}

impl SourceProvider for Program {
  fn file_name(&self, file: FileId) -> Option<&str> {
    self.file(file).map(|f| f.name.as_str())
  }

  fn file_text(&self, file: FileId) -> Option<&str> {
    self.file(file).map(|f| f.text.as_str())
  }
}

/// Any slice of files as a [`SourceProvider`], looked up by [`FileId`].
#[derive(Clone, Copy, Debug)]
pub struct SourceFiles<'a>(pub &'a [SourceFile]);

impl<'a> SourceFiles<'a> {
  pub fn get(&self, file: FileId) -> Option<&'a SourceFile> {
    self.0.iter().find(|f| f.id == file)
  }
}

impl SourceProvider for SourceFiles<'_> {
  fn file_name(&self, file: FileId) -> Option<&str> {
    self.get(file).map(|f| f.name.as_str())
  }

  fn file_text(&self, file: FileId) -> Option<&str> {
    self.get(file).map(|f| f.text.as_str())
  }
}
