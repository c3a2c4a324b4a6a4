use tiny_regex_compiler::{compile, compile_with_config, Config, ParseErr, ParseErrKind};
use tiny_regex_runtime::{run, search};

fn run_pattern(pattern: &str, input: &str) -> Option<usize> {
    let program = compile(pattern).expect("pattern compiles");
    run(&program, input, 0)
}

fn search_pattern<'a>(pattern: &str, input: &'a str) -> Option<(usize, usize, &'a str)> {
    let program = compile(pattern).expect("pattern compiles");
    search(&program, input)
}

#[test]
fn should_match_anchored_at_start() {
    let tests = vec![
        // (pattern, input, consumed)
        ("", "abc", Some(0)),
        ("ab", "abc", Some(2)),
        ("ab+", "abbbc", Some(4)),
        ("ab+", "ac", None),
        ("a?b", "b", Some(1)),
        ("x\\+", "x+", Some(2)),
        ("é+", "ééa", Some(4)),
        (".", "\n", None),
        ("[.]", ".", Some(1)),
        ("[.]", "a", None),
        ("a[bc]+d", "abcbd", Some(5)),
        ("(ab)*", "ababa", Some(4)),
        ("(a|b)*c", "abbac", Some(5)),
        ("(a|ab)c", "abc", Some(3)),
        ("a|b|c", "c", Some(1)),
        ("a$", "aa", None),
        ("a$", "a", Some(1)),
    ];

    for (test_id, (pattern, input, expected)) in tests.into_iter().enumerate() {
        assert_eq!(expected, run_pattern(pattern, input), "test_id: {}", test_id);
    }
}

#[test]
fn should_alternate_between_single_characters() {
    assert_eq!(Some(1), run_pattern("a|b", "a"));
    assert_eq!(Some(1), run_pattern("a|b", "b"));
    assert_eq!(None, run_pattern("a|b", ""));
}

#[test]
fn should_never_retry_fewer_greedy_repetitions() {
    assert_eq!(None, run_pattern("a*a", "aaa"));
    assert_eq!(None, run_pattern("c*^", "c"));
    assert_eq!(Some(0), run_pattern("c*^", ""));
}

#[test]
fn should_stop_lazy_repetition_at_first_viable_continuation() {
    let tests = vec![
        (".+?b", "abcb", Some(2)),
        (".*?b", "abcb", Some(2)),
        (".*?b", "b", Some(1)),
        ("a+?", "aaa", Some(1)),
        ("a*?", "aaa", Some(0)),
        ("(ab)+?c", "ababc", Some(5)),
        (".+?b", "b", None),
    ];

    for (test_id, (pattern, input, expected)) in tests.into_iter().enumerate() {
        assert_eq!(expected, run_pattern(pattern, input), "test_id: {}", test_id);
    }
}

#[test]
fn should_search_for_first_matching_offset() {
    let tests = vec![
        // (pattern, input, match)
        ("b+", "aabbbc", Some((2, 3, "c"))),
        ("z", "abc", None),
        ("", "abc", Some((0, 0, "abc"))),
        ("$", "abc", Some((3, 0, ""))),
        ("^a", "ba", Some((1, 1, ""))),
        ("a$", "aa", Some((1, 1, ""))),
        ("l+o", "hello\nworld", Some((2, 3, "\nworld"))),
        ("ü", "aüb", Some((1, 2, "b"))),
    ];

    for (test_id, (pattern, input, expected)) in tests.into_iter().enumerate() {
        assert_eq!(expected, search_pattern(pattern, input), "test_id: {}", test_id);
    }
}

#[test]
fn should_report_compilation_errors_with_offsets() {
    let tests = vec![
        ("a**", ParseErr::new(ParseErrKind::SyntaxError, 2)),
        ("(ab", ParseErr::new(ParseErrKind::SyntaxError, 0)),
        ("ab)", ParseErr::new(ParseErrKind::SyntaxError, 2)),
        ("[ab", ParseErr::new(ParseErrKind::SyntaxError, 0)),
        ("ab\\", ParseErr::new(ParseErrKind::SyntaxError, 2)),
        ("a??", ParseErr::new(ParseErrKind::SyntaxError, 2)),
    ];

    for (test_id, (pattern, expected)) in tests.into_iter().enumerate() {
        assert_eq!(Err(expected), compile(pattern), "test_id: {}", test_id);
    }
}

#[test]
fn should_reject_deeply_nested_patterns() {
    let pattern = format!("{}a{}", "(".repeat(300), ")".repeat(300));

    assert_eq!(
        Some(ParseErrKind::StackOverflow),
        compile(&pattern).err().map(|err| err.kind)
    );

    let config = Config::default().with_max_nesting_depth(300).with_max_recursion_depth(300);
    let program = compile_with_config(&pattern, &config).expect("pattern compiles");
    assert_eq!(Some(1), run(&program, "a", 0));
}

#[test]
fn should_match_long_chains_of_quantified_atoms() {
    let tests = vec![
        // (pattern, input, expected)
        ("a?".repeat(600), "a".repeat(700), Some(600)),
        ("[ab]*".repeat(600), "ab".repeat(10), Some(20)),
        ("a+".repeat(600), "a".repeat(599), None),
    ];

    for (test_id, (pattern, input, expected)) in tests.into_iter().enumerate() {
        assert_eq!(expected, run_pattern(&pattern, &input), "test_id: {}", test_id);
    }
}
