use corny::Session;

use pretty_assertions::assert_eq;
use regex::Regex;
use test_generator::test_resources;

/// Each non-comment line of a case file is fed to one session, the way the
/// shell would. Lines ending in `// expect: <output>` are checked.
#[test_resources("tests/corny_test_cases/**/*.corny")]
fn test_treewalk_interpreter(file: &str) {
    let source = std::fs::read_to_string(file).unwrap();
    let output_regexer = Regex::new(r"// expect: (.*)$").unwrap();

    let mut session = Session::new();
    let mut expected = vec![];
    let mut actual = vec![];

    for (line_no, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let output = session.eval_line(trimmed);
        if let Some(r) = output_regexer.captures(line) {
            let want = r.get(1).unwrap().as_str().trim_end().to_owned();
            expected.push(format!("{}: {}", line_no + 1, want));
            actual.push(format!("{}: {}", line_no + 1, output));
        }
    }

    assert!(!expected.is_empty(), "{} has no expectations", file);
    assert_eq!(expected, actual);
}
