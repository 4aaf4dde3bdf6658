use crate::loc::Loc;
use crate::symbol::SymbolId;
use crate::symbol::TypeId;
use serde::Deserialize;
use serde::Serialize;

/// Index of a node within its file's [`SyntaxTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Syntactic category of a node.
///
/// Only the categories the renamer distinguishes are named; everything else is
/// [`SyntaxKind::Other`] and goes through the generic copy path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SyntaxKind {
  SourceFile,
  Identifier,
  Modifier,
  PropertyAccessExpression,
  PropertyDeclaration,
  PropertySignature,
  PropertyAssignment,
  ShorthandPropertyAssignment,
  MethodDeclaration,
  MethodSignature,
  GetAccessor,
  SetAccessor,
  Constructor,
  Parameter,
  VariableDeclaration,
  CallExpression,
  NewExpression,
  ReturnStatement,
  FunctionDeclaration,
  FunctionExpression,
  ArrowFunction,
  ClassDeclaration,
  ClassExpression,
  InterfaceDeclaration,
  TypeLiteral,
  ObjectLiteralExpression,
  TypeReference,
  Other,
}

impl SyntaxKind {
  /// Nodes that can carry a declared return type.
  pub fn is_function_like(self) -> bool {
    matches!(
      self,
      SyntaxKind::FunctionDeclaration
        | SyntaxKind::FunctionExpression
        | SyntaxKind::ArrowFunction
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::GetAccessor
        | SyntaxKind::SetAccessor
        | SyntaxKind::Constructor
    )
  }

  /// Nodes whose type owns the members declared inside them.
  pub fn is_member_container(self) -> bool {
    matches!(
      self,
      SyntaxKind::ClassDeclaration
        | SyntaxKind::ClassExpression
        | SyntaxKind::InterfaceDeclaration
        | SyntaxKind::TypeLiteral
        | SyntaxKind::ObjectLiteralExpression
    )
  }

  /// Nodes whose `Name` child is the declared name of a member.
  pub fn is_member_declaration(self) -> bool {
    matches!(
      self,
      SyntaxKind::PropertyDeclaration
        | SyntaxKind::PropertySignature
        | SyntaxKind::PropertyAssignment
        | SyntaxKind::ShorthandPropertyAssignment
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::MethodSignature
        | SyntaxKind::GetAccessor
        | SyntaxKind::SetAccessor
    )
  }

  pub fn is_call_like(self) -> bool {
    matches!(self, SyntaxKind::CallExpression | SyntaxKind::NewExpression)
  }
}

/// Role a child plays inside its parent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Field {
  Name,
  Expression,
  Callee,
  Argument,
  Type,
  Initializer,
  ReturnType,
  Modifier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
  pub kind: SyntaxKind,
  pub field: Option<Field>,
  /// Span without leading trivia.
  pub loc: Loc,
  /// Span including leading whitespace and comments.
  pub full: Loc,
  pub parent: Option<NodeId>,
  pub children: Vec<NodeId>,
  pub symbol: Option<SymbolId>,
  pub ty: Option<TypeId>,
}

/// Arena of nodes for a single file. Children are ordered by start offset,
/// never overlap, and lie within their parent's `loc`.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
  nodes: Vec<SyntaxNode>,
  root: NodeId,
}

impl SyntaxTree {
  pub(crate) fn from_parts(nodes: Vec<SyntaxNode>, root: NodeId) -> Self {
    Self { nodes, root }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Panics if `id` did not come from this tree.
  pub fn node(&self, id: NodeId) -> &SyntaxNode {
    &self.nodes[id.0 as usize]
  }

  pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
    self.nodes.get(id.0 as usize)
  }

  pub fn kind(&self, id: NodeId) -> SyntaxKind {
    self.node(id).kind
  }

  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.node(id).children
  }

  pub fn child_by_field(&self, id: NodeId, field: Field) -> Option<NodeId> {
    self
      .children(id)
      .iter()
      .copied()
      .find(|&child| self.node(child).field == Some(field))
  }

  pub fn children_by_field(&self, id: NodeId, field: Field) -> impl Iterator<Item = NodeId> + '_ {
    self
      .children(id)
      .iter()
      .copied()
      .filter(move |&child| self.node(child).field == Some(field))
  }

  /// Ancestors from the parent up to the root.
  pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(self.node(id).parent, move |&current| {
      self.node(current).parent
    })
  }

  /// Closest ancestor satisfying `pred`.
  pub fn enclosing(&self, id: NodeId, pred: impl Fn(SyntaxKind) -> bool) -> Option<NodeId> {
    self.ancestors(id).find(|&anc| pred(self.kind(anc)))
  }

  /// Every node in pre-order (parents before children, children in source order).
  pub fn preorder(&self) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(self.nodes.len());
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      order.push(id);
      stack.extend(self.children(id).iter().rev().copied());
    }
    order
  }
}

#[cfg(test)]
mod tests {
  use crate::build::FileBuilder;
  use crate::build::ProgramBuilder;
  use crate::syntax::Field;
  use crate::syntax::SyntaxKind;

  #[test]
  fn field_lookup_and_ancestors() {
    let mut b = ProgramBuilder::new();
    let mut file = FileBuilder::new("a.ts", "f(x, y);");
    let call = file.node(SyntaxKind::CallExpression, file.find("f(x, y)", 0)).id();
    file.node(SyntaxKind::Identifier, file.find("f", 0)).field(Field::Callee);
    let x = file.node(SyntaxKind::Identifier, file.find("x", 0)).field(Field::Argument).id();
    file.node(SyntaxKind::Identifier, file.find("y", 0)).field(Field::Argument);
    let file_id = b.file(file);
    let program = b.build().unwrap();
    let tree = &program.file(file_id).unwrap().tree;

    let callee = tree.child_by_field(call, Field::Callee).unwrap();
    assert_eq!(program.file(file_id).unwrap().text_of(callee), "f");
    assert_eq!(tree.children_by_field(call, Field::Argument).count(), 2);
    assert_eq!(tree.enclosing(x, SyntaxKind::is_call_like), Some(call));
    assert_eq!(tree.ancestors(x).last(), Some(tree.root()));
    assert_eq!(tree.preorder().first(), Some(&tree.root()));
  }
}
