use criterion::{criterion_group, criterion_main, Criterion};
use tiny_regex_compiler::*;

pub fn serialization_of_program_into_bytecode(c: &mut Criterion) {
    let prog = compile("^x(a|bc)*?[a-z_]+$").expect("pattern compiles");

    c.bench_function("serialize instruction to binary format", |b| {
        b.iter(|| {
            let res = criterion::black_box(to_binary(&prog));
            assert!(res.is_ok())
        })
    });
}

criterion_group!(benches, serialization_of_program_into_bytecode);
criterion_main!(benches);
