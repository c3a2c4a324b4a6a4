use criterion::{criterion_group, criterion_main, Criterion};
use tiny_regex_runtime::*;

pub fn deserialization_of_bytecode_into_a_ir_program(c: &mut Criterion) {
    let bytecode_arr = [
        240, 240, 1, 0, 1, 0, 0, 0, 4, 0, 0, 0, 0, 2, 0, 0, // header
        2, 0, 0, 0, 120, 0, 0, 0, 121, 0, 0, 0, // [xy]
        1, 0, 0, 0, 0, 0, 0, 0, // Any
        8, 0, 0, 0, 3, 0, 0, 0, // OneOrMore(3)
        3, 0, 0, 0, 0, 0, 0, 0, // ConsumeSet(0)
        13, 0, 0, 0, 0, 0, 0, 0, // Match
    ];
    let bin = bytecode_arr.as_slice();

    c.bench_function("deserialize binary to internal representation", |b| {
        b.iter(|| {
            let res = criterion::black_box(bytecode::from_binary(bin));
            assert!(res.is_ok())
        })
    });
}

criterion_group!(benches, deserialization_of_bytecode_into_a_ir_program);
criterion_main!(benches);
