use ahash::HashSet;
use once_cell::sync::Lazy;

/// Digits of the name code, in increasing order.
pub const ALPHABET: &[u8; 64] = b"$_0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    // Keywords and reserved words of the output language.
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "await", "let", "static", "implements",
    "interface", "package", "private", "protected", "public",
    // Older future reserved words, still rejected by some engines.
    "abstract", "boolean", "byte", "char", "double", "final", "float", "goto", "int", "long",
    "native", "short", "synchronized", "throws", "transient", "volatile",
  ]
  .into_iter()
  .collect()
});

pub fn is_reserved(name: &str) -> bool {
  RESERVED.contains(name)
}

/// Whether every character of `code` is in [`ALPHABET`].
pub fn is_code(code: &str) -> bool {
  code.bytes().all(|c| ALPHABET.contains(&c))
}

fn digit(c: u8) -> usize {
  debug_assert!(ALPHABET.contains(&c), "{:?} is not a name code digit", c as char);
  ALPHABET.iter().position(|&d| d == c).unwrap_or(0)
}

/// Odometer increment of `code` in the base-64 [`ALPHABET`].
fn increment(code: &str) -> String {
  let mut digits: Vec<usize> = code.bytes().map(digit).collect();
  let mut pos = digits.len();
  loop {
    if pos == 0 {
      digits.insert(0, 0);
      break;
    }
    pos -= 1;
    if digits[pos] + 1 < ALPHABET.len() {
      digits[pos] += 1;
      break;
    }
    digits[pos] = 0;
  }
  digits.into_iter().map(|d| ALPHABET[d] as char).collect()
}

/// The next valid identifier after `previous` in generation order.
///
/// `previous` must be empty or a code over [`ALPHABET`]; other characters are
/// read as `$` in release builds.
///
/// Reserved words are skipped. A candidate starting with a digit is replaced by
/// `a` padded with `$` to the same length, which is the first code of that
/// length with a letter in front.
pub fn next_name(previous: &str) -> String {
  let mut candidate = increment(previous);
  loop {
    if candidate.as_bytes()[0].is_ascii_digit() {
      candidate = format!("a{}", "$".repeat(candidate.len() - 1));
    }
    if !is_reserved(&candidate) {
      return candidate;
    }
    candidate = increment(&candidate);
  }
}

/// Stateful wrapper around [`next_name`] remembering the last generated code.
#[derive(Clone, Debug, Default)]
pub struct NameGenerator {
  last: String,
}

impl NameGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Continues generation after `last`, a previously generated code.
  ///
  /// # Panics
  ///
  /// In debug builds, panics if `last` has characters outside [`ALPHABET`].
  pub fn resume(last: impl Into<String>) -> Self {
    let last = last.into();
    debug_assert!(is_code(&last), "{last:?} is not a generated name");
    Self { last }
  }

  pub fn last(&self) -> &str {
    &self.last
  }

  pub fn next_name(&mut self) -> String {
    let name = next_name(&self.last);
    self.last.clone_from(&name);
    name
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generator_sequence() {
    assert_eq!(next_name(""), "$");
    assert_eq!(next_name("$"), "_");
    assert_eq!(next_name("a"), "b");
    assert_eq!(next_name("z"), "A");
    assert_eq!(next_name("Z"), "$$");
    assert_eq!(next_name("9"), "a");
    assert_eq!(next_name("az"), "aA");
    assert_eq!(next_name("$Z"), "_$");
  }

  #[test]
  fn leading_digits_are_padded() {
    assert_eq!(next_name("_"), "a");
    assert_eq!(next_name("_Z"), "a$");
    assert_eq!(next_name("_ZZ"), "a$$");
  }

  #[test]
  fn reserved_words_are_skipped() {
    assert_eq!(next_name("im"), "io");
    assert_eq!(next_name("ie"), "ig");
    assert_eq!(next_name("dn"), "dp");
    assert_eq!(next_name("nev"), "nex");
  }

  #[test]
  fn stateful_generator_continues_from_last() {
    let mut names = NameGenerator::new();
    let first: Vec<_> = (0..4).map(|_| names.next_name()).collect();
    assert_eq!(first, ["$", "_", "a", "b"]);
    assert_eq!(names.last(), "b");

    let mut resumed = NameGenerator::resume("Z");
    assert_eq!(resumed.next_name(), "$$");
  }

  #[test]
  fn codes_are_checked_against_the_alphabet() {
    assert!(is_code(""));
    assert!(is_code("$_9aZ"));
    assert!(!is_code("!"));
    assert!(!is_code("a-b"));
  }

  #[test]
  #[cfg(debug_assertions)]
  #[should_panic(expected = "is not a generated name")]
  fn resuming_from_a_foreign_name_is_rejected() {
    NameGenerator::resume("!");
  }
}
