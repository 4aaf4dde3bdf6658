use crate::cast::reference_symbol;
use crate::codes;
use crate::eligibility::Conflict;
use crate::eligibility::Eligibility;
use crate::err::MangleError;
use crate::options::MangleOptions;
use crate::rename::RenameState;
use diagnostics::Diagnostic;
use diagnostics::Label;
use itertools::Itertools;
use program_ts::Field;
use program_ts::Loc;
use program_ts::NodeId;
use program_ts::SourceFile;
use program_ts::Symbol;
use program_ts::SymbolId;
use program_ts::SyntaxKind;
use program_ts::TypeChecker;
use tracing::debug_span;
use tracing::trace;

/// Modifiers that turn a constructor parameter into a property declaration.
const PARAMETER_PROPERTY_MODIFIERS: &[&str] =
  &["public", "private", "protected", "readonly", "override"];

/// A substitution made in the output. `loc` is the span of the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
  pub loc: Loc,
  pub original: String,
  pub replacement: String,
}

/// Output of rewriting one file.
#[derive(Clone, Debug, Default)]
pub struct Rewritten {
  pub text: String,
  /// In source order.
  pub replacements: Vec<Replacement>,
  /// Recoverable problems; the text keeps original names at their sites.
  pub diagnostics: Vec<Diagnostic>,
}

/// Reproduces a file's text, substituting generated names for renameable
/// member names.
///
/// Every node is copied from its own span with its children spliced in, so any
/// text not covered by a substitution comes out byte-identical.
pub struct RewriteEngine<'a, C: ?Sized> {
  file: &'a SourceFile,
  eligibility: &'a Eligibility<'a, C>,
  state: &'a mut RenameState,
  options: MangleOptions,
  replacements: Vec<Replacement>,
  diagnostics: Vec<Diagnostic>,
}

impl<'a, C: TypeChecker + ?Sized> RewriteEngine<'a, C> {
  pub fn new(
    file: &'a SourceFile,
    eligibility: &'a Eligibility<'a, C>,
    state: &'a mut RenameState,
    options: MangleOptions,
  ) -> Self {
    Self {
      file,
      eligibility,
      state,
      options,
      replacements: Vec::new(),
      diagnostics: Vec::new(),
    }
  }

  pub fn rewrite_file(mut self) -> Result<Rewritten, MangleError> {
    let file = self.file;
    let _span = debug_span!("rewrite_file", file = %file.name).entered();
    let root = file.tree.root();
    let loc = file.tree.node(root).loc;
    let mut out = String::with_capacity(file.text.len());
    out.push_str(&file.text[..loc.0]);
    self.rewrite(root, &mut out)?;
    out.push_str(&file.text[loc.1..]);
    Ok(Rewritten {
      text: out,
      replacements: self.replacements,
      diagnostics: self.diagnostics,
    })
  }

  /// Appends the rewritten text of `node` to `out`.
  pub fn rewrite(&mut self, node: NodeId, out: &mut String) -> Result<(), MangleError> {
    match self.file.tree.kind(node) {
      SyntaxKind::PropertyAccessExpression => self.rewrite_property_access(node, out),
      SyntaxKind::Parameter if self.is_parameter_property(node) => self.rewrite_member(node, out),
      kind if kind.is_member_declaration() => self.rewrite_member(node, out),
      _ => self.splice(node, None, out),
    }
  }

  /// Copies `node` from its span, rewriting children recursively, except for
  /// `substitute`'s node which is replaced by its text.
  fn splice(
    &mut self,
    node: NodeId,
    substitute: Option<(NodeId, String)>,
    out: &mut String,
  ) -> Result<(), MangleError> {
    let file = self.file;
    let tree = &file.tree;
    let loc = tree.node(node).loc;
    let mut cursor = loc.0;
    for &child in tree.children(node) {
      let child_loc = tree.node(child).loc;
      out.push_str(&file.text[cursor..child_loc.0]);
      match &substitute {
        Some((target, text)) if *target == child => self.substitute(child, text, out),
        _ => self.rewrite(child, out)?,
      }
      cursor = child_loc.1;
    }
    out.push_str(&file.text[cursor..loc.1]);
    Ok(())
  }

  fn substitute(&mut self, node: NodeId, text: &str, out: &mut String) {
    let file = self.file;
    let loc = file.tree.node(node).loc;
    let original = file.text_at(loc);
    trace!(file = %file.name, original, replacement = text, "substitute");
    out.push_str(text);
    self.replacements.push(Replacement {
      loc,
      original: original.to_string(),
      replacement: text.to_string(),
    });
  }

  fn rewrite_property_access(&mut self, node: NodeId, out: &mut String) -> Result<(), MangleError> {
    let tree = &self.file.tree;
    let (Some(lhs), Some(name)) = (
      tree.child_by_field(node, Field::Expression),
      tree.child_by_field(node, Field::Name),
    ) else {
      return self.splice(node, None, out);
    };
    let renamed = self.access_name(lhs, name)?;
    self.splice(node, renamed.map(|text| (name, text)), out)
  }

  fn access_name(&mut self, lhs: NodeId, name: NodeId) -> Result<Option<String>, MangleError> {
    let file = self.file;
    let checker = self.eligibility.checker();
    if file.tree.kind(name) != SyntaxKind::Identifier {
      return Ok(None);
    }
    // Qualified names through a namespace or module are not members.
    let is_module = reference_symbol(checker, file, lhs)
      .and_then(|symbol| checker.symbol(symbol))
      .is_some_and(Symbol::is_module);
    if is_module {
      return Ok(None);
    }
    // Untyped receivers and types without a symbol (`any`, primitives) give
    // no owner to decide eligibility from.
    let Some(owner) = checker.type_symbol_of(file, lhs) else {
      self.unresolvable(name)?;
      return Ok(None);
    };
    self.renamed(owner, name)
  }

  fn rewrite_member(&mut self, node: NodeId, out: &mut String) -> Result<(), MangleError> {
    let file = self.file;
    let tree = &file.tree;
    let checker = self.eligibility.checker();
    let Some(name) = tree
      .child_by_field(node, Field::Name)
      .filter(|&name| tree.kind(name) == SyntaxKind::Identifier)
    else {
      return self.splice(node, None, out);
    };
    // A container without a resolvable type keeps its member names.
    let owner = tree
      .enclosing(node, SyntaxKind::is_member_container)
      .and_then(|container| checker.type_symbol_of(file, container));
    let renamed = match owner {
      Some(owner) => self.renamed(owner, name)?,
      None => None,
    };
    let renamed = match (tree.kind(node), renamed) {
      // `{ bar }` becomes `{ $: bar }` so the local binding is still read.
      (SyntaxKind::ShorthandPropertyAssignment, Some(renamed)) => {
        Some(format!("{renamed}: {}", file.text_of(name)))
      }
      (_, renamed) => renamed,
    };
    self.splice(node, renamed.map(|text| (name, text)), out)
  }

  fn is_parameter_property(&self, node: NodeId) -> bool {
    let file = self.file;
    let tree = &file.tree;
    tree.children(node).iter().any(|&child| {
      let modifier = tree.node(child);
      (modifier.kind == SyntaxKind::Modifier || modifier.field == Some(Field::Modifier))
        && PARAMETER_PROPERTY_MODIFIERS.contains(&file.text_of(child))
    })
  }

  /// Generated name for `name` if members of `owner` may be renamed.
  fn renamed(&mut self, owner: SymbolId, name: NodeId) -> Result<Option<String>, MangleError> {
    let renameable = self
      .eligibility
      .is_renameable(owner)
      .map_err(|conflict| self.conflict(conflict, name))?;
    if !renameable {
      return Ok(None);
    }
    let file = self.file;
    Ok(Some(self.state.rename(file.text_of(name)).to_string()))
  }

  fn unresolvable(&mut self, name: NodeId) -> Result<(), MangleError> {
    let file = self.file;
    let diagnostic = codes::UNRESOLVABLE_SYMBOL.error(
      format!(
        "symbol information could not be extracted for `{}`",
        file.text_of(name)
      ),
      file.tree.node(name).loc.to_span(file.id),
    );
    if self.options.fail_fast {
      return Err(MangleError::Unresolvable(diagnostic));
    }
    self.diagnostics.push(diagnostic);
    Ok(())
  }

  fn conflict(&self, conflict: Conflict, name: NodeId) -> MangleError {
    let file = self.file;
    let checker = self.eligibility.checker();
    let type_name = checker.symbol_name(conflict.symbol);
    let mut diagnostic = codes::CONFLICTING_ELIGIBILITY.error(
      format!(
        "cannot decide whether members of `{type_name}` may be renamed: it is cast to both program-owned and external types"
      ),
      file.tree.node(name).loc.to_span(file.id),
    );
    if let Some(decl) = checker
      .symbol(conflict.symbol)
      .and_then(|symbol| symbol.declarations.first())
    {
      diagnostic = diagnostic.with_label(Label::secondary(
        decl.loc.to_span(decl.file),
        format!("`{type_name}` declared here"),
      ));
    }
    diagnostic.push_note(format!(
      "program-owned targets: {}",
      conflict
        .internal
        .iter()
        .map(|&symbol| checker.symbol_name(symbol))
        .join(", ")
    ));
    diagnostic.push_note(format!(
      "external targets: {}",
      conflict
        .external
        .iter()
        .map(|target| target.map_or("<unresolved>", |symbol| checker.symbol_name(symbol)))
        .join(", ")
    ));
    MangleError::Conflict {
      symbol: conflict.symbol,
      diagnostic,
    }
  }
}
