use ahash::HashMap;
use program_ts::Field;
use program_ts::NodeId;
use program_ts::SourceFile;
use program_ts::SymbolId;
use program_ts::SyntaxKind;
use program_ts::TypeChecker;
use tracing::debug;
use tracing::debug_span;

/// Observed coercions between type symbols.
///
/// An edge `from -> to` means a value typed `to` was used where `from` was
/// expected, or the reverse for assignments and returns; see [`collect_casts`].
/// A `None` target is a type the frontend could not tie to a symbol.
#[derive(Clone, Debug, Default)]
pub struct CastGraph {
  edges: HashMap<SymbolId, Vec<Option<SymbolId>>>,
}

impl CastGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, from: SymbolId, to: Option<SymbolId>) {
    self.edges.entry(from).or_default().push(to);
  }

  /// Targets recorded for `from`, in discovery order.
  pub fn targets(&self, from: SymbolId) -> &[Option<SymbolId>] {
    self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn has_edges(&self, from: SymbolId) -> bool {
    self.edges.contains_key(&from)
  }

  /// Number of distinct source symbols.
  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  pub fn edge_count(&self) -> usize {
    self.edges.values().map(Vec::len).sum()
  }
}

/// Symbol a node refers to. For a property access that is the symbol of its
/// name, since frontends usually attach the member symbol there.
pub(crate) fn reference_symbol<C: TypeChecker + ?Sized>(
  checker: &C,
  file: &SourceFile,
  node: NodeId,
) -> Option<SymbolId> {
  checker.symbol_of(file, node).or_else(|| {
    if file.tree.kind(node) != SyntaxKind::PropertyAccessExpression {
      return None;
    }
    let name = file.tree.child_by_field(node, Field::Name)?;
    checker.symbol_of(file, name)
  })
}

struct CastCollector<'a, C: ?Sized> {
  checker: &'a C,
  file: &'a SourceFile,
  graph: &'a mut CastGraph,
}

impl<C: TypeChecker + ?Sized> CastCollector<'_, C> {
  fn record(&mut self, from: Option<SymbolId>, to: Option<SymbolId>) {
    let Some(from) = from else {
      return;
    };
    debug!(
      file = %self.file.name,
      from = self.checker.symbol_name(from),
      to = to.map(|to| self.checker.symbol_name(to)).unwrap_or("<unresolved>"),
      "cast edge"
    );
    self.graph.record(from, to);
  }

  fn visit_call(&mut self, node: NodeId) {
    let tree = &self.file.tree;
    let Some(callee) = tree.child_by_field(node, Field::Callee) else {
      return;
    };
    let Some(signature) = reference_symbol(self.checker, self.file, callee)
      .and_then(|callee| self.checker.signature_of(callee))
    else {
      return;
    };
    let pairs: Vec<_> = signature
      .parameters
      .iter()
      .zip(tree.children_by_field(node, Field::Argument))
      .map(|(param, arg)| {
        (
          param.and_then(|ty| self.checker.type_symbol(ty)),
          self.checker.type_symbol_of(self.file, arg),
        )
      })
      .collect();
    for (from, to) in pairs {
      self.record(from, to);
    }
  }

  fn visit_variable(&mut self, node: NodeId) {
    let tree = &self.file.tree;
    let (Some(annotation), Some(init)) = (
      tree.child_by_field(node, Field::Type),
      tree.child_by_field(node, Field::Initializer),
    ) else {
      return;
    };
    let from = self.checker.type_symbol_of(self.file, init);
    let to = self.checker.type_symbol_of(self.file, annotation);
    self.record(from, to);
  }

  fn visit_return(&mut self, node: NodeId) {
    let tree = &self.file.tree;
    let Some(expr) = tree.child_by_field(node, Field::Expression) else {
      return;
    };
    let Some(declared) = tree
      .enclosing(node, SyntaxKind::is_function_like)
      .and_then(|func| tree.child_by_field(func, Field::ReturnType))
    else {
      return;
    };
    let from = self.checker.type_symbol_of(self.file, expr);
    let to = self.checker.type_symbol_of(self.file, declared);
    self.record(from, to);
  }

  fn visit_file(&mut self) {
    for node in self.file.tree.preorder() {
      match self.file.tree.kind(node) {
        SyntaxKind::CallExpression | SyntaxKind::NewExpression => self.visit_call(node),
        SyntaxKind::VariableDeclaration => self.visit_variable(node),
        SyntaxKind::ReturnStatement => self.visit_return(node),
        _ => {}
      }
    }
  }
}

/// Walks every program-owned file and records cast edges at call sites,
/// annotated variable initializers and return statements.
///
/// Call sites record parameter type to argument type, pairwise by position.
/// Variables record initializer type to annotation type and returns record
/// returned type to the declared return type. Edges whose source type has no
/// symbol are dropped.
pub fn collect_casts<'a, C: TypeChecker + ?Sized>(
  files: impl IntoIterator<Item = &'a SourceFile>,
  checker: &C,
) -> CastGraph {
  let _span = debug_span!("collect_casts").entered();
  let mut graph = CastGraph::new();
  for file in files.into_iter().filter(|file| !file.external) {
    CastCollector {
      checker,
      file,
      graph: &mut graph,
    }
    .visit_file();
  }
  debug!(
    symbols = graph.len(),
    edges = graph.edge_count(),
    "collected casts"
  );
  graph
}

#[cfg(test)]
mod tests {
  use super::*;
  use program_ts::FileBuilder;
  use program_ts::ProgramBuilder;
  use program_ts::Signature;
  use program_ts::SymbolKind;

  #[test]
  fn graph_keeps_discovery_order() {
    let mut graph = CastGraph::new();
    graph.record(SymbolId(1), Some(SymbolId(2)));
    graph.record(SymbolId(1), None);
    graph.record(SymbolId(1), Some(SymbolId(1)));
    assert_eq!(graph.targets(SymbolId(1)), &[Some(SymbolId(2)), None, Some(SymbolId(1))]);
    assert!(graph.targets(SymbolId(9)).is_empty());
    assert_eq!((graph.len(), graph.edge_count()), (1, 3));
  }

  #[test]
  fn records_calls_variables_and_returns() {
    let mut b = ProgramBuilder::new();
    let src = "function g(a: A): R { return out; } const v: V = init; g(x, y);";
    let mut file = FileBuilder::new("main.ts", src);

    let a = b.symbol("A", SymbolKind::Type);
    let r = b.symbol("R", SymbolKind::Type);
    let v = b.symbol("V", SymbolKind::Type);
    let i = b.symbol("I", SymbolKind::Type);
    let x = b.symbol("X", SymbolKind::Type);
    let g = b.symbol("g", SymbolKind::Function);
    let a_ty = b.ty("A", Some(a));
    let r_ty = b.ty("R", Some(r));
    let v_ty = b.ty("V", Some(v));
    let i_ty = b.ty("I", Some(i));
    let x_ty = b.ty("X", Some(x));
    b.signature(g, Signature {
      parameters: vec![Some(a_ty)],
      returns: Some(r_ty),
    });

    file.node(SyntaxKind::FunctionDeclaration, file.find("function g(a: A): R { return out; }", 0));
    file.node(SyntaxKind::Identifier, file.find("g", 0)).field(Field::Name).symbol(g);
    file.node(SyntaxKind::TypeReference, file.find("R", 0)).field(Field::ReturnType).ty(r_ty);
    file.node(SyntaxKind::ReturnStatement, file.find("return out;", 0));
    file.node(SyntaxKind::Identifier, file.find("out", 0)).field(Field::Expression).ty(i_ty);

    file.node(SyntaxKind::VariableDeclaration, file.find("v: V = init", 0));
    file.node(SyntaxKind::Identifier, file.find("v", 0)).field(Field::Name);
    file.node(SyntaxKind::TypeReference, file.find("V", 0)).field(Field::Type).ty(v_ty);
    file.node(SyntaxKind::Identifier, file.find("init", 0)).field(Field::Initializer).ty(i_ty);

    file.node(SyntaxKind::CallExpression, file.find("g(x, y)", 0));
    file.node(SyntaxKind::Identifier, file.find("g", 1)).field(Field::Callee).symbol(g);
    file.node(SyntaxKind::Identifier, file.find("x", 0)).field(Field::Argument).ty(x_ty);
    file.node(SyntaxKind::Identifier, file.find("y", 0)).field(Field::Argument).ty(x_ty);
    b.file(file);
    let program = b.build().unwrap();

    let graph = collect_casts(program.files(), &program);
    assert_eq!(graph.targets(a), &[Some(x)]);
    assert_eq!(graph.targets(i), &[Some(r), Some(v)]);
    assert_eq!(graph.edge_count(), 3);
  }

  #[test]
  fn external_files_and_untyped_sources_are_ignored() {
    let mut b = ProgramBuilder::new();
    let t = b.symbol("T", SymbolKind::Type);
    let t_ty = b.ty("T", Some(t));
    let any_ty = b.ty("any", None);

    let mut lib = FileBuilder::new("lib.d.ts", "declare const a: T = b;").external();
    lib.node(SyntaxKind::VariableDeclaration, lib.find("a: T = b", 0));
    lib.node(SyntaxKind::TypeReference, lib.find("T", 0)).field(Field::Type).ty(t_ty);
    lib.node(SyntaxKind::Identifier, lib.find("b", 0)).field(Field::Initializer).ty(t_ty);
    b.file(lib);

    let mut main = FileBuilder::new("main.ts", "const p: T = d; const e: any = p;");
    main.node(SyntaxKind::VariableDeclaration, main.find("p: T = d", 0));
    main.node(SyntaxKind::TypeReference, main.find("T", 0)).field(Field::Type).ty(t_ty);
    main.node(SyntaxKind::Identifier, main.find("d", 0)).field(Field::Initializer).ty(any_ty);
    main.node(SyntaxKind::VariableDeclaration, main.find("e: any = p", 0));
    main.node(SyntaxKind::TypeReference, main.find("any", 0)).field(Field::Type).ty(any_ty);
    main.node(SyntaxKind::Identifier, main.find("p", 1)).field(Field::Initializer).ty(t_ty);
    b.file(main);
    let program = b.build().unwrap();

    let graph = collect_casts(program.files(), &program);
    assert_eq!(graph.targets(t), &[None]);
    assert_eq!(graph.edge_count(), 1);
  }
}
