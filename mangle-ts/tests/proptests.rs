use ahash::HashMap;
use ahash::HashSet;
use mangle_ts::names::is_reserved;
use mangle_ts::names::ALPHABET;
use mangle_ts::next_name;
use mangle_ts::MangleOptions;
use mangle_ts::Minifier;
use mangle_ts::NameGenerator;
use mangle_ts::RenameState;
use program_ts::Field;
use program_ts::FileBuilder;
use program_ts::Loc;
use program_ts::ProgramBuilder;
use program_ts::SymbolKind;
use program_ts::SyntaxKind;
use proptest::prelude::*;

fn code() -> impl Strategy<Value = String> {
  prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..5)
    .prop_map(|bytes| String::from_utf8(bytes).unwrap())
}

fn ident() -> impl Strategy<Value = String> {
  const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
  prop::collection::vec(prop::sample::select(CHARS.to_vec()), 1..6)
    .prop_map(|bytes| String::from_utf8(bytes).unwrap())
}

fn separator() -> impl Strategy<Value = String> {
  prop::sample::select(vec![
    " ".to_string(),
    "\n".to_string(),
    " /* note */ ".to_string(),
    "\n// line\n".to_string(),
  ])
}

/// Generation order: shorter codes first, then by alphabet position.
fn order_key(code: &str) -> (usize, Vec<usize>) {
  let digits = code
    .bytes()
    .map(|c| ALPHABET.iter().position(|&d| d == c).unwrap())
    .collect();
  (code.len(), digits)
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(256))]

  #[test]
  fn next_name_is_a_valid_later_identifier(previous in code()) {
    let next = next_name(&previous);
    prop_assert!(!is_reserved(&next));
    prop_assert!(!next.as_bytes()[0].is_ascii_digit());
    prop_assert!(next.bytes().all(|c| ALPHABET.contains(&c)));
    prop_assert!(order_key(&next) > order_key(&previous));
  }

  #[test]
  fn generated_names_never_repeat(start in code(), count in 1usize..400) {
    let mut names = NameGenerator::resume(start);
    let mut seen = HashSet::default();
    for _ in 0..count {
      prop_assert!(seen.insert(names.next_name()));
    }
  }

  #[test]
  fn rename_state_is_a_consistent_injection(originals in prop::collection::vec(ident(), 1..40)) {
    let mut state = RenameState::new();
    let first: Vec<String> = originals.iter().map(|name| state.rename(name).to_string()).collect();
    let second: Vec<String> = originals.iter().map(|name| state.rename(name).to_string()).collect();
    prop_assert_eq!(&first, &second);

    let mut inverse = HashMap::default();
    for (original, renamed) in originals.iter().zip(&first) {
      let previous = inverse.insert(renamed.clone(), original.clone());
      prop_assert!(previous.map_or(true, |previous| &previous == original));
    }
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn only_accessed_names_change(
    statements in prop::collection::vec((ident(), separator()), 1..20),
  ) {
    let mut b = ProgramBuilder::new();
    let t = b.symbol("T", SymbolKind::Type);
    let t_ty = b.ty("T", Some(t));

    let mut src = String::new();
    let mut accesses = Vec::new();
    for (name, sep) in &statements {
      let start = src.len();
      src.push_str("p.");
      src.push_str(name);
      accesses.push(Loc(start, src.len()));
      src.push(';');
      src.push_str(sep);
    }

    let mut file = FileBuilder::new("main.ts", src.clone());
    for access in &accesses {
      file.node(SyntaxKind::PropertyAccessExpression, *access);
      file.node(SyntaxKind::Identifier, Loc(access.0, access.0 + 1)).field(Field::Expression).ty(t_ty);
      file.node(SyntaxKind::Identifier, Loc(access.0 + 2, access.1)).field(Field::Name);
    }
    let main = b.file(file);
    b.declare(t, main, Loc(0, 1));
    let program = b.build().unwrap();

    let run = || Minifier::new(MangleOptions::new()).rename_program(&program).unwrap();
    let output = run();
    let renames: HashMap<&str, &str> = output.renames().into_iter().collect();

    let mut expected = String::new();
    for (name, sep) in &statements {
      expected.push_str("p.");
      expected.push_str(renames[name.as_str()]);
      expected.push(';');
      expected.push_str(sep);
    }
    prop_assert_eq!(&output.files[0].text, &expected);
    prop_assert_eq!(output.files[0].replacements.len(), statements.len());
    prop_assert_eq!(&run().files[0].text, &expected);
  }
}
