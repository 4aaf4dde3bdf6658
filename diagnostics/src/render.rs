use crate::Diagnostic;
use crate::FileId;
use crate::Label;
use std::fmt::Write;

const TAB_WIDTH: usize = 2;

/// Provides access to source text for rendering diagnostics.
pub trait SourceProvider {
  fn file_name(&self, file: FileId) -> Option<&str>;
  fn file_text(&self, file: FileId) -> Option<&str>;
}

/// Converts a byte offset into a 1-based `(line, column)` pair. Columns count
/// characters, not bytes. Offsets past the end clamp to the end of the text.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
  let offset = clamp_offset_to_char_boundary(text, offset);
  let before = &text[..offset];
  let line = before.matches('\n').count() + 1;
  let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
  let col = text[line_start..offset].chars().count() + 1;
  (line, col)
}

/// Renders the one-line `file:line:column: message` form.
pub fn render_short(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  let name = provider
    .file_name(diagnostic.primary.file)
    .unwrap_or("<unknown>");
  match provider.file_text(diagnostic.primary.file) {
    Some(text) => {
      let (line, col) = line_col(text, diagnostic.primary.range.start as usize);
      format!("{name}:{line}:{col}: {}", diagnostic.message)
    }
    None => format!("{name}:?:?: {}", diagnostic.message),
  }
}

/// Render a diagnostic into a human-readable string with caret highlighting.
pub fn render_diagnostic(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  let mut output = String::new();

  let mut labels = Vec::with_capacity(diagnostic.labels.len() + 1);
  labels.push(Label::primary(diagnostic.primary, diagnostic.message.clone()));
  labels.extend(diagnostic.labels.iter().cloned());
  labels.sort_by(|a, b| {
    b.is_primary
      .cmp(&a.is_primary)
      .then(a.span.file.cmp(&b.span.file))
      .then(a.span.range.start.cmp(&b.span.range.start))
      .then(a.message.cmp(&b.message))
  });

  let _ = writeln!(
    output,
    "{}[{}]: {}",
    diagnostic.severity, diagnostic.code, diagnostic.message
  );

  let mut current_file = None;
  for label in &labels {
    let name = provider.file_name(label.span.file).unwrap_or("<unknown>");
    let Some(text) = provider.file_text(label.span.file) else {
      let _ = writeln!(output, " --> {name}:?:?");
      let _ = writeln!(output, "  | <source unavailable>");
      continue;
    };
    let start = clamp_offset_to_char_boundary(text, label.span.range.start as usize);
    let (line, col) = line_col(text, start);
    if current_file != Some(label.span.file) {
      let _ = writeln!(output, " --> {name}:{line}:{col}");
      current_file = Some(label.span.file);
    }
    render_label_line(&mut output, text, label, line);
  }

  for note in &diagnostic.notes {
    let _ = writeln!(output, "= note: {note}");
  }

  output
}

fn render_label_line(output: &mut String, text: &str, label: &Label, line: usize) {
  let start = clamp_offset_to_char_boundary(text, label.span.range.start as usize);
  let end = clamp_offset_to_char_boundary(text, label.span.range.end as usize).max(start);
  let line_start = text[..start].rfind('\n').map(|idx| idx + 1).unwrap_or(0);
  let line_end = text[start..]
    .find('\n')
    .map(|idx| start + idx)
    .unwrap_or(text.len());
  let raw_line = &text[line_start..line_end];
  let gutter = line.to_string();
  let pad = " ".repeat(gutter.len());

  let start_col = display_width(&text[line_start..start], TAB_WIDTH);
  let end_col = display_width(&text[line_start..end.min(line_end)], TAB_WIDTH);
  let len = end_col.saturating_sub(start_col).max(1);
  let marker = if label.is_primary { '^' } else { '-' };

  let _ = writeln!(output, "{pad} |");
  let _ = writeln!(output, "{gutter} | {}", expand_tabs(raw_line, TAB_WIDTH));
  let _ = write!(output, "{pad} | {}", " ".repeat(start_col));
  output.extend(std::iter::repeat(marker).take(len));
  if !label.message.is_empty() {
    let _ = write!(output, " {}", label.message);
  }
  output.push('\n');
}

fn expand_tabs(line: &str, tab_width: usize) -> String {
  line.replace('\t', &" ".repeat(tab_width))
}

fn display_width(segment: &str, tab_width: usize) -> usize {
  segment
    .chars()
    .map(|ch| if ch == '\t' { tab_width } else { 1 })
    .sum()
}

fn clamp_offset_to_char_boundary(text: &str, offset: usize) -> usize {
  let mut offset = offset.min(text.len());
  while offset > 0 && !text.is_char_boundary(offset) {
    offset -= 1;
  }
  offset
}
