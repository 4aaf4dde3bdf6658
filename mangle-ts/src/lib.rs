//! Type-aware property renaming for TypeScript programs.
//!
//! A run has two phases. First every program-owned file is scanned for casts
//! between types ([`cast::collect_casts`]), which decides per type symbol
//! whether its members may be renamed ([`eligibility::Eligibility`]). Then each
//! file is reproduced from its source text with renameable member names
//! replaced by short generated names ([`rewrite::RewriteEngine`]). Everything
//! that is not a substituted name comes out byte-identical.
//!
//! ```
//! use mangle_ts::{MangleOptions, Minifier};
//! use program_ts::{Field, FileBuilder, Loc, ProgramBuilder, SymbolKind, SyntaxKind};
//!
//! let mut b = ProgramBuilder::new();
//! let mut file = FileBuilder::new("main.ts", "class Foo { bar = 1; }");
//! let foo = b.symbol("Foo", SymbolKind::Type);
//! let foo_ty = b.ty("Foo", Some(foo));
//! file.node(SyntaxKind::ClassDeclaration, file.find("class Foo { bar = 1; }", 0)).ty(foo_ty);
//! file.node(SyntaxKind::PropertyDeclaration, file.find("bar = 1;", 0));
//! file.node(SyntaxKind::Identifier, file.find("bar", 0)).field(Field::Name);
//! let main = b.file(file);
//! b.declare(foo, main, Loc(6, 9));
//! let program = b.build().unwrap();
//!
//! let output = Minifier::new(MangleOptions::new()).rename_program(&program).unwrap();
//! assert_eq!(output.files[0].text, "class Foo { $ = 1; }");
//! ```

pub mod cast;
pub mod codes;
pub mod eligibility;
mod err;
pub mod names;
mod options;
pub mod rename;
pub mod rewrite;

pub use cast::CastGraph;
pub use eligibility::Eligibility;
pub use eligibility::Verdict;
pub use err::MangleError;
pub use names::next_name;
pub use names::NameGenerator;
pub use options::MangleOptions;
pub use rename::RenameState;
pub use rewrite::Replacement;

use cast::collect_casts;
use diagnostics::render::render_short;
use diagnostics::sort_diagnostics;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use itertools::Itertools;
use program_ts::Program;
use program_ts::SourceFile;
use program_ts::SourceFiles;
use program_ts::TypeChecker;
use rewrite::RewriteEngine;
use tracing::debug;
use tracing::debug_span;

/// A program-owned file after renaming.
#[derive(Clone, Debug)]
pub struct RenamedFile {
  pub file: FileId,
  pub name: String,
  pub text: String,
  pub replacements: Vec<Replacement>,
}

#[derive(Clone, Debug, Default)]
pub struct RenameOutput {
  /// Files that rewrote without errors, in input order.
  pub files: Vec<RenamedFile>,
  /// Recoverable diagnostics, sorted. Files they belong to are withheld.
  pub diagnostics: Vec<Diagnostic>,
  pub state: RenameState,
}

impl RenameOutput {
  /// Every assigned name, ordered by original name.
  pub fn renames(&self) -> Vec<(&str, &str)> {
    self.state.renames()
  }

  pub fn file(&self, name: &str) -> Option<&RenamedFile> {
    self.files.iter().find(|file| file.name == name)
  }

  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(Diagnostic::is_error)
  }
}

/// Runs the rename over whole programs. Each run starts from fresh state.
#[derive(Clone, Debug, Default)]
pub struct Minifier {
  options: MangleOptions,
}

impl Minifier {
  pub fn new(options: MangleOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &MangleOptions {
    &self.options
  }

  pub fn rename_program(&self, program: &Program) -> Result<RenameOutput, MangleError> {
    self.rename_files(program.files(), program)
  }

  /// Renames `files`, resolving symbols and types through `checker`.
  ///
  /// All files are scanned for casts before any is rewritten. External files
  /// contribute nothing and produce no output.
  pub fn rename_files<C: TypeChecker + ?Sized>(
    &self,
    files: &[SourceFile],
    checker: &C,
  ) -> Result<RenameOutput, MangleError> {
    let _span = debug_span!("rename_files", files = files.len()).entered();
    check_frontend_diagnostics(files)?;

    let casts = collect_casts(files, checker);
    let eligibility = Eligibility::new(checker, &casts);
    let mut state = RenameState::new();
    let mut output = RenameOutput::default();

    for file in files.iter().filter(|file| !file.external) {
      let rewritten = RewriteEngine::new(file, &eligibility, &mut state, self.options).rewrite_file()?;
      if rewritten.diagnostics.iter().any(Diagnostic::is_error) {
        debug!(file = %file.name, "withholding output");
      } else {
        output.files.push(RenamedFile {
          file: file.id,
          name: file.name.clone(),
          text: rewritten.text,
          replacements: rewritten.replacements,
        });
      }
      output.diagnostics.extend(rewritten.diagnostics);
    }

    sort_diagnostics(&mut output.diagnostics);
    output.state = state;
    Ok(output)
  }
}

/// Fails with every frontend diagnostic of program-owned files, if any.
fn check_frontend_diagnostics(files: &[SourceFile]) -> Result<(), MangleError> {
  let diagnostics: Vec<_> = files
    .iter()
    .filter(|file| !file.external)
    .flat_map(|file| {
      file
        .diagnostics
        .iter()
        .map(|diag| codes::MALFORMED_INPUT.error(diag.message.clone(), diag.loc.to_span(file.id)))
    })
    .collect();
  if diagnostics.is_empty() {
    return Ok(());
  }
  let provider = SourceFiles(files);
  let report = diagnostics
    .iter()
    .map(|diagnostic| render_short(&provider, diagnostic))
    .join("\n");
  Err(MangleError::MalformedInput {
    diagnostics,
    report,
  })
}
