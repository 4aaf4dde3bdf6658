use crate::loc::Loc;
use diagnostics::FileId;
use serde::Deserialize;
use serde::Serialize;

/// Opaque identity of a declared entity. Two occurrences of the same declared
/// thing always carry the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SymbolKind {
  Type,
  Property,
  Method,
  Variable,
  Function,
  Module,
  Parameter,
}

/// A single declaration site of a symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Declaration {
  pub file: FileId,
  pub loc: Loc,
  /// Declared in an interface-only source (e.g. a `.d.ts` file).
  pub external: bool,
}

/// Declared parameter and return types of a callable symbol. `None` entries
/// are parameters without a resolvable type.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Signature {
  pub parameters: Vec<Option<TypeId>>,
  pub returns: Option<TypeId>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
  pub name: String,
  pub kind: SymbolKind,
  pub declarations: Vec<Declaration>,
  pub signature: Option<Signature>,
}

impl Symbol {
  pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
    Self {
      name: name.into(),
      kind,
      declarations: Vec::new(),
      signature: None,
    }
  }

  /// True when any declaration comes from an interface-only source.
  pub fn is_external(&self) -> bool {
    self.declarations.iter().any(|decl| decl.external)
  }

  pub fn is_module(&self) -> bool {
    self.kind == SymbolKind::Module
  }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Type {
  /// Display name, used only in diagnostics.
  pub name: String,
  /// Primitives and `any` have no symbol.
  pub symbol: Option<SymbolId>,
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
  symbols: Vec<Symbol>,
  types: Vec<Type>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
    let id = SymbolId(self.symbols.len() as u32);
    self.symbols.push(symbol);
    id
  }

  pub fn add_type(&mut self, ty: Type) -> TypeId {
    let id = TypeId(self.types.len() as u32);
    self.types.push(ty);
    id
  }

  pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
    self.symbols.get(id.0 as usize)
  }

  pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
    self.symbols.get_mut(id.0 as usize)
  }

  pub fn ty(&self, id: TypeId) -> Option<&Type> {
    self.types.get(id.0 as usize)
  }

  pub fn types(&self) -> impl Iterator<Item = &Type> + '_ {
    self.types.iter()
  }

  pub fn symbol_count(&self) -> usize {
    self.symbols.len()
  }

  pub fn type_count(&self) -> usize {
    self.types.len()
  }
}
