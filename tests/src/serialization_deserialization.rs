use tiny_regex_compiler::bytecode::ToBytecode;
use tiny_regex_compiler::compile;
use tiny_regex_runtime::bytecode::FromBytecode;
use tiny_regex_runtime::*;

#[test]
fn should_preserve_equivalent_representation_in_bytecode_encoding() {
    let input_output = [
        Instructions::new(vec![], vec![Opcode::Any, Opcode::Match]),
        Instructions::new(
            vec![CharacterSet::from("az"), CharacterSet::from("a")],
            vec![
                Opcode::Any,
                Opcode::ConsumeSet(InstConsumeSet::new(1)),
                Opcode::Match,
            ],
        )
        .with_recursion_limit(16),
        Instructions::new(
            vec![],
            vec![
                Opcode::LazyZeroOrMore(InstRepeat::new(InstIndex::from(1))),
                Opcode::Any,
                Opcode::Or(InstOr::new(InstIndex::from(4))),
                Opcode::Consume(InstConsume::new('a')),
                Opcode::Consume(InstConsume::new('é')),
                Opcode::Match,
            ],
        ),
    ];

    for (test_case, program) in input_output.into_iter().enumerate() {
        let generated_bytecode = program.to_bytecode().expect("program fits the layout");
        let deserialized_program_result = Instructions::from_bytecode(generated_bytecode);

        // assert the generated output matches the expected output
        assert_eq!(
            (test_case, Ok(program)),
            (test_case, deserialized_program_result)
        );
    }
}

#[test]
fn should_round_trip_compiled_programs() {
    let patterns = [
        "ab",
        "ab+",
        "^(a|bc)*?d$",
        "[xyz]+[zyx]?",
        "((a)+(b|c|d))*",
        ".+?\\.",
    ];

    for (test_case, pattern) in patterns.into_iter().enumerate() {
        let program = compile(pattern).expect("pattern compiles");
        let generated_bytecode = program.to_bytecode().expect("program fits the layout");

        assert_eq!(
            (test_case, Ok(program)),
            (test_case, bytecode::from_binary(generated_bytecode))
        );
    }
}

#[test]
fn should_match_identically_after_round_trip() {
    let program = compile("(ab)*c|d").expect("pattern compiles");
    let decoded = program
        .to_bytecode()
        .ok()
        .and_then(|bin| bytecode::from_binary(bin).ok())
        .expect("program round trips");

    for input in ["ababc", "c", "d", "abab", ""] {
        assert_eq!(run(&program, input, 0), run(&decoded, input, 0), "input: {}", input);
    }
}
