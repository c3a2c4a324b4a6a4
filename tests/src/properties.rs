use proptest::prelude::*;
use tiny_regex_compiler::bytecode::ToBytecode;
use tiny_regex_compiler::compile;
use tiny_regex_compiler::lexer::tokenize;
use tiny_regex_runtime::{bytecode, run, search};

fn pattern_strategy() -> impl Strategy<Value = String> {
    "[ab.|()\\[\\]*+?^$\\\\]{0,10}"
}

fn subject_strategy() -> impl Strategy<Value = String> {
    "[abé\n]{0,12}"
}

proptest! {
    #[test]
    fn tokens_partition_any_pattern(pattern in "\\PC{0,16}") {
        if let Ok(tokens) = tokenize(&pattern) {
            let mut next_offset = 0;
            for token in tokens {
                prop_assert_eq!(next_offset, token.offset);
                prop_assert!(token.len >= 1);
                next_offset = token.end();
            }
            prop_assert_eq!(pattern.len(), next_offset);
        }
    }

    #[test]
    fn compiled_programs_fit_pattern_length(pattern in pattern_strategy()) {
        if let Ok(program) = compile(&pattern) {
            prop_assert!(program.len() <= pattern.len() + 1);
        }
    }

    #[test]
    fn run_consumes_at_most_the_subject(pattern in pattern_strategy(), subject in subject_strategy()) {
        let program = compile(&pattern);
        prop_assume!(program.is_ok());
        let program = program.expect("assumed");

        let consumed = run(&program, &subject, 0);
        if let Some(len) = consumed {
            prop_assert!(len <= subject.len());
        }
        prop_assert_eq!(consumed, run(&program, &subject, 0));
    }

    #[test]
    fn search_returns_the_smallest_matching_offset(pattern in pattern_strategy(), subject in subject_strategy()) {
        let program = compile(&pattern);
        prop_assume!(program.is_ok());
        let program = program.expect("assumed");

        let boundaries: Vec<usize> = (0..=subject.len())
            .filter(|offset| subject.is_char_boundary(*offset))
            .collect();

        match search(&program, &subject) {
            Some((offset, len, remainder)) => {
                prop_assert_eq!(Some(len), run(&program, &subject, offset));
                prop_assert_eq!(&subject[offset + len..], remainder);
                for earlier in boundaries.into_iter().filter(|boundary| *boundary < offset) {
                    prop_assert_eq!(None, run(&program, &subject, earlier));
                }
            }
            None => {
                for boundary in boundaries {
                    prop_assert_eq!(None, run(&program, &subject, boundary));
                }
            }
        }
    }

    #[test]
    fn bytecode_round_trips(pattern in pattern_strategy()) {
        if let Ok(program) = compile(&pattern) {
            let bin = program.to_bytecode();
            prop_assert!(bin.is_ok());
            let decoded = bin.ok().map(bytecode::from_binary);
            prop_assert_eq!(Some(Ok(program)), decoded);
        }
    }
}
