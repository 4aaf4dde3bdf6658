use anyhow::{Context, Result};
use clap::Parser;
use diagnostics::render::render_diagnostic;
use diagnostics::Diagnostic;
use mangle_ts::{MangleError, MangleOptions, Minifier, RenameOutput};
use program_ts::Program;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(
  name = "mangle-ts",
  author,
  version,
  about = "Rename TypeScript properties to short names using type information"
)]
struct Cli {
  /// Program dump (JSON) produced by the frontend.
  program: PathBuf,

  /// Write renamed files into this directory. Without it nothing is written.
  #[arg(long)]
  out_dir: Option<PathBuf>,

  /// Output paths mirror file names relative to this directory.
  #[arg(long, default_value = ".")]
  base_path: PathBuf,

  /// Abort on the first property access whose symbol cannot be resolved.
  #[arg(long)]
  fail_fast: bool,

  /// Emit JSON results instead of rendered diagnostics.
  #[arg(long)]
  json: bool,

  /// Print every assigned name as `original -> renamed`.
  #[arg(long)]
  print_renames: bool,

  /// Emit tracing spans as JSON to stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
  files: Vec<JsonFile<'a>>,
  renames: BTreeMap<&'a str, &'a str>,
  diagnostics: &'a [Diagnostic],
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
  name: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  path: Option<PathBuf>,
  replacements: usize,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.trace);
  match run(&cli) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::DEBUG)
    .with_writer(std::io::stderr)
    .json()
    .with_ansi(false)
    .try_init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
  let dump = fs::read_to_string(&cli.program)
    .with_context(|| format!("failed to read {}", cli.program.display()))?;
  let program = Program::from_json(&dump)
    .with_context(|| format!("failed to load program from {}", cli.program.display()))?;

  let minifier = Minifier::new(MangleOptions::new().with_fail_fast(cli.fail_fast));
  let output = match minifier.rename_program(&program) {
    Ok(output) => output,
    Err(err) => {
      report_error(cli, &program, &err)?;
      return Ok(ExitCode::FAILURE);
    }
  };

  let written = write_outputs(cli, &output)?;
  report(cli, &program, &output, &written)?;
  Ok(if output.has_errors() {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  })
}

fn write_outputs(cli: &Cli, output: &RenameOutput) -> Result<Vec<Option<PathBuf>>> {
  let Some(out_dir) = &cli.out_dir else {
    return Ok(vec![None; output.files.len()]);
  };
  let mut written = Vec::with_capacity(output.files.len());
  for file in &output.files {
    let path = output_path(out_dir, &cli.base_path, &file.name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, &file.text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(
      file = %file.name,
      path = %path.display(),
      replacements = file.replacements.len(),
      "wrote output"
    );
    written.push(Some(path));
  }
  Ok(written)
}

fn report(
  cli: &Cli,
  program: &Program,
  output: &RenameOutput,
  written: &[Option<PathBuf>],
) -> Result<()> {
  if cli.json {
    let json = JsonOutput {
      files: output
        .files
        .iter()
        .zip(written)
        .map(|(file, path)| JsonFile {
          name: &file.name,
          path: path.clone(),
          replacements: file.replacements.len(),
        })
        .collect(),
      renames: output.renames().into_iter().collect(),
      diagnostics: &output.diagnostics,
      error: None,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    return Ok(());
  }

  for diagnostic in &output.diagnostics {
    eprintln!("{}", render_diagnostic(program, diagnostic));
  }
  if cli.print_renames {
    for (original, renamed) in output.renames() {
      println!("{original} -> {renamed}");
    }
  }
  Ok(())
}

fn report_error(cli: &Cli, program: &Program, err: &MangleError) -> Result<()> {
  if cli.json {
    let json = JsonOutput {
      files: Vec::new(),
      renames: BTreeMap::new(),
      diagnostics: err.diagnostics(),
      error: Some(err.to_string()),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    return Ok(());
  }

  match err {
    MangleError::MalformedInput { .. } => eprintln!("{err}"),
    _ => {
      for diagnostic in err.diagnostics() {
        eprintln!("{}", render_diagnostic(program, diagnostic));
      }
    }
  }
  Ok(())
}

/// Where the output for the source file `name` goes under `out_dir`.
///
/// Names under `base_path` keep their relative path. Anything else would
/// escape `out_dir`, so only its file name is kept.
fn output_path(out_dir: &Path, base_path: &Path, name: &str) -> PathBuf {
  let name = normalize(Path::new(name));
  let relative = name
    .strip_prefix(normalize(base_path))
    .ok()
    .filter(|relative| {
      relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    });
  match relative {
    Some(relative) if !relative.as_os_str().is_empty() => out_dir.join(relative),
    _ => out_dir.join(name.file_name().unwrap_or(name.as_os_str())),
  }
}

fn normalize(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|component| !matches!(component, Component::CurDir))
    .collect()
}
