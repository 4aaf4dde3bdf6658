use crate::error::BuildError;
use crate::loc::Loc;
use crate::program::FrontendDiagnostic;
use crate::program::Program;
use crate::program::SourceFile;
use crate::symbol::Declaration;
use crate::symbol::Signature;
use crate::symbol::Symbol;
use crate::symbol::SymbolId;
use crate::symbol::SymbolKind;
use crate::symbol::SymbolTable;
use crate::symbol::Type;
use crate::symbol::TypeId;
use crate::syntax::Field;
use crate::syntax::NodeId;
use crate::syntax::SyntaxKind;
use crate::syntax::SyntaxNode;
use crate::syntax::SyntaxTree;
use diagnostics::FileId;

/// A node awaiting placement in the tree. Nesting is not given explicitly; it
/// is inferred from spans when the program is built.
#[derive(Clone, Debug)]
pub struct NodeSpec {
  id: NodeId,
  kind: SyntaxKind,
  loc: Loc,
  full: Option<Loc>,
  field: Option<Field>,
  symbol: Option<SymbolId>,
  ty: Option<TypeId>,
}

impl NodeSpec {
  pub fn id(&self) -> NodeId {
    self.id
  }

  pub fn field(&mut self, field: Field) -> &mut Self {
    self.field = Some(field);
    self
  }

  pub fn symbol(&mut self, symbol: SymbolId) -> &mut Self {
    self.symbol = Some(symbol);
    self
  }

  pub fn ty(&mut self, ty: TypeId) -> &mut Self {
    self.ty = Some(ty);
    self
  }

  /// Span including leading trivia. Defaults to the node's own span.
  pub fn full(&mut self, full: Loc) -> &mut Self {
    self.full = Some(full);
    self
  }
}

/// Collects the nodes of one source file.
#[derive(Clone, Debug)]
pub struct FileBuilder {
  name: String,
  text: String,
  external: bool,
  nodes: Vec<NodeSpec>,
  diagnostics: Vec<FrontendDiagnostic>,
}

impl FileBuilder {
  pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      text: text.into(),
      external: false,
      nodes: Vec::new(),
      diagnostics: Vec::new(),
    }
  }

  /// Marks the file as an interface-only source.
  pub fn external(mut self) -> Self {
    self.external = true;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Location of the `nth` (zero-based) occurrence of `needle`.
  pub fn try_find(&self, needle: &str, nth: usize) -> Option<Loc> {
    self
      .text
      .match_indices(needle)
      .nth(nth)
      .map(|(start, matched)| Loc(start, start + matched.len()))
  }

  /// Location of the `nth` (zero-based) occurrence of `needle`.
  ///
  /// # Panics
  ///
  /// Panics if there is no such occurrence; use [`FileBuilder::try_find`] for
  /// untrusted input.
  pub fn find(&self, needle: &str, nth: usize) -> Loc {
    match self.try_find(needle, nth) {
      Some(loc) => loc,
      None => panic!(
        "occurrence {nth} of {needle:?} not found in {}",
        self.name
      ),
    }
  }

  pub fn node(&mut self, kind: SyntaxKind, loc: Loc) -> &mut NodeSpec {
    let id = NodeId(self.nodes.len() as u32 + 1);
    self.nodes.push(NodeSpec {
      id,
      kind,
      loc,
      full: None,
      field: None,
      symbol: None,
      ty: None,
    });
    let last = self.nodes.len() - 1;
    &mut self.nodes[last]
  }

  pub fn diagnostic(&mut self, loc: Loc, message: impl Into<String>) -> &mut Self {
    self.diagnostics.push(FrontendDiagnostic {
      loc,
      message: message.into(),
    });
    self
  }

  fn check_loc(&self, loc: Loc) -> Result<(), BuildError> {
    if loc.0 > loc.1 || loc.1 > self.text.len() {
      return Err(BuildError::SpanOutOfBounds {
        file: self.name.clone(),
        loc,
        len: self.text.len(),
      });
    }
    for offset in [loc.0, loc.1] {
      if !self.text.is_char_boundary(offset) {
        return Err(BuildError::NotCharBoundary {
          file: self.name.clone(),
          offset,
        });
      }
    }
    Ok(())
  }

  fn finish(self, id: FileId, table: &SymbolTable) -> Result<SourceFile, BuildError> {
    let root_loc = Loc(0, self.text.len());
    let mut arena = Vec::with_capacity(self.nodes.len() + 1);
    arena.push(SyntaxNode {
      kind: SyntaxKind::SourceFile,
      field: None,
      loc: root_loc,
      full: root_loc,
      parent: None,
      children: Vec::new(),
      symbol: None,
      ty: None,
    });

    for spec in &self.nodes {
      self.check_loc(spec.loc)?;
      let full = spec.full.unwrap_or(spec.loc);
      self.check_loc(full)?;
      if full.0 > spec.loc.0 || full.1 != spec.loc.1 {
        return Err(BuildError::TriviaMismatch {
          file: self.name.clone(),
          loc: spec.loc,
          full,
        });
      }
      if let Some(symbol) = spec.symbol {
        if table.symbol(symbol).is_none() {
          return Err(BuildError::UnknownSymbol {
            file: self.name.clone(),
            symbol,
          });
        }
      }
      if let Some(ty) = spec.ty {
        if table.ty(ty).is_none() {
          return Err(BuildError::UnknownType {
            file: self.name.clone(),
            ty,
          });
        }
      }
      arena.push(SyntaxNode {
        kind: spec.kind,
        field: spec.field,
        loc: spec.loc,
        full,
        parent: None,
        children: Vec::new(),
        symbol: spec.symbol,
        ty: spec.ty,
      });
    }

    // Outer nodes sort before the nodes they contain; ties keep insertion order.
    let mut order: Vec<usize> = (1..arena.len()).collect();
    order.sort_by(|&a, &b| {
      let (la, lb) = (arena[a].loc, arena[b].loc);
      la.0.cmp(&lb.0).then(lb.1.cmp(&la.1)).then(a.cmp(&b))
    });

    let mut stack = vec![0usize];
    for idx in order {
      let loc = arena[idx].loc;
      while let Some(&top) = stack.last() {
        if arena[top].loc.contains(loc) {
          break;
        }
        stack.pop();
      }
      // The root spans the whole text, so the stack is never emptied.
      let parent = stack.last().copied().unwrap_or(0);
      if let Some(&prev) = arena[parent].children.last() {
        let prev_loc = arena[prev.0 as usize].loc;
        if prev_loc.1 > loc.0 {
          return Err(BuildError::Overlap {
            file: self.name.clone(),
            first: prev_loc,
            second: loc,
          });
        }
      }
      arena[parent].children.push(NodeId(idx as u32));
      arena[idx].parent = Some(NodeId(parent as u32));
      stack.push(idx);
    }

    Ok(SourceFile {
      id,
      name: self.name,
      text: self.text,
      external: self.external,
      tree: SyntaxTree::from_parts(arena, NodeId(0)),
      diagnostics: self.diagnostics,
    })
  }
}

#[derive(Clone, Debug)]
struct PendingDeclaration {
  symbol: SymbolId,
  file: FileId,
  loc: Loc,
}

/// Assembles a [`Program`] from files, symbols and types.
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
  table: SymbolTable,
  files: Vec<FileBuilder>,
  declarations: Vec<PendingDeclaration>,
}

impl ProgramBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn symbol(&mut self, name: impl Into<String>, kind: SymbolKind) -> SymbolId {
    self.table.add_symbol(Symbol::new(name, kind))
  }

  /// Records a declaration of `symbol` in `file`. Whether it is external is
  /// taken from the file when the program is built.
  pub fn declare(&mut self, symbol: SymbolId, file: FileId, loc: Loc) {
    self.declarations.push(PendingDeclaration { symbol, file, loc });
  }

  pub fn signature(&mut self, symbol: SymbolId, signature: Signature) {
    if let Some(sym) = self.table.symbol_mut(symbol) {
      sym.signature = Some(signature);
    }
  }

  pub fn ty(&mut self, name: impl Into<String>, symbol: Option<SymbolId>) -> TypeId {
    self.table.add_type(Type {
      name: name.into(),
      symbol,
    })
  }

  /// Id the next added file will receive.
  pub fn next_file_id(&self) -> FileId {
    FileId(self.files.len() as u32)
  }

  pub fn file(&mut self, file: FileBuilder) -> FileId {
    let id = self.next_file_id();
    self.files.push(file);
    id
  }

  pub fn build(mut self) -> Result<Program, BuildError> {
    if let Some(symbol) = self
      .table
      .types()
      .filter_map(|ty| ty.symbol)
      .find(|&symbol| self.table.symbol(symbol).is_none())
    {
      return Err(BuildError::UnknownTypeSymbol { symbol });
    }

    for decl in std::mem::take(&mut self.declarations) {
      let external = self
        .files
        .get(decl.file.0 as usize)
        .map(|file| file.external)
        .ok_or(BuildError::UnknownFile { file: decl.file })?;
      let sym = self
        .table
        .symbol_mut(decl.symbol)
        .ok_or(BuildError::UnknownDeclaredSymbol {
          symbol: decl.symbol,
        })?;
      sym.declarations.push(Declaration {
        file: decl.file,
        loc: decl.loc,
        external,
      });
    }

    let mut files = Vec::with_capacity(self.files.len());
    for (idx, file) in self.files.into_iter().enumerate() {
      files.push(file.finish(FileId(idx as u32), &self.table)?);
    }
    Ok(Program {
      files,
      table: self.table,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nesting_is_inferred_from_spans() {
    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "foo.bar.baz;");
    let outer = file.node(SyntaxKind::PropertyAccessExpression, file.find("foo.bar.baz", 0)).id();
    let inner = file
      .node(SyntaxKind::PropertyAccessExpression, file.find("foo.bar", 0))
      .field(Field::Expression)
      .id();
    let foo = file.node(SyntaxKind::Identifier, file.find("foo", 0)).field(Field::Expression).id();
    let bar = file.node(SyntaxKind::Identifier, file.find("bar", 0)).field(Field::Name).id();
    let baz = file.node(SyntaxKind::Identifier, file.find("baz", 0)).field(Field::Name).id();
    let id = b.file(file);
    let program = b.build().unwrap();
    let tree = &program.file(id).unwrap().tree;

    assert_eq!(tree.children(tree.root()), &[outer]);
    assert_eq!(tree.children(outer), &[inner, baz]);
    assert_eq!(tree.children(inner), &[foo, bar]);
    assert_eq!(tree.node(foo).parent, Some(inner));
  }

  #[test]
  fn identical_spans_nest_in_insertion_order() {
    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "x");
    let first = file.node(SyntaxKind::Other, Loc(0, 1)).id();
    let second = file.node(SyntaxKind::Identifier, Loc(0, 1)).id();
    let id = b.file(file);
    let program = b.build().unwrap();
    let tree = &program.file(id).unwrap().tree;
    assert_eq!(tree.node(second).parent, Some(first));
  }

  #[test]
  fn partial_overlap_is_rejected() {
    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "abcdef");
    file.node(SyntaxKind::Other, Loc(0, 4));
    file.node(SyntaxKind::Other, Loc(2, 6));
    b.file(file);
    assert!(matches!(b.build(), Err(BuildError::Overlap { .. })));
  }

  #[test]
  fn out_of_bounds_and_dangling_ids_are_rejected() {
    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "abc");
    file.node(SyntaxKind::Other, Loc(1, 9));
    b.file(file);
    assert!(matches!(b.build(), Err(BuildError::SpanOutOfBounds { .. })));

    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "abc");
    file.node(SyntaxKind::Identifier, Loc(0, 1)).symbol(SymbolId(3));
    b.file(file);
    assert!(matches!(b.build(), Err(BuildError::UnknownSymbol { .. })));
  }

  #[test]
  fn declarations_inherit_file_provenance() {
    let mut b = ProgramBuilder::new();
    let lib = b.file(FileBuilder::new("lib.d.ts", "interface Math {}").external());
    let main = b.file(FileBuilder::new("main.ts", "class Foo {}"));
    let math = b.symbol("Math", SymbolKind::Type);
    let foo = b.symbol("Foo", SymbolKind::Type);
    b.declare(math, lib, Loc(10, 14));
    b.declare(foo, main, Loc(6, 9));
    let program = b.build().unwrap();
    assert!(program.table().symbol(math).unwrap().is_external());
    assert!(!program.table().symbol(foo).unwrap().is_external());
  }

  #[test]
  fn declaring_into_a_missing_file_fails() {
    let mut b = ProgramBuilder::new();
    let sym = b.symbol("x", SymbolKind::Variable);
    b.declare(sym, FileId(2), Loc(0, 1));
    assert!(matches!(b.build(), Err(BuildError::UnknownFile { .. })));
  }
}
