use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tiny_regex_compiler::*;

fn pad_input_to_length_with(prefix: &str, suffix: &str, pad_str: &str, len: usize) -> String {
    let prefix_len = prefix.chars().count();
    let suffix_len = suffix.chars().count();

    if (suffix_len + prefix_len) > len {
        "".to_string()
    } else {
        prefix
            .chars()
            .chain(pad_str.chars().cycle().take(len - suffix_len - prefix_len))
            .chain(suffix.chars())
            .collect()
    }
}

pub fn exponential_pattern_size_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern length compilation comparison");

    (1..10)
        .map(|exponent| 2usize.pow(exponent))
        .map(|len| (pad_input_to_length_with("^", "$", "a|b+", len), len))
        .for_each(|(pattern, sample_size)| {
            group.throughput(Throughput::Elements(sample_size as u64));
            group.bench_with_input(
                BenchmarkId::new("pattern input length of size", sample_size),
                &pattern,
                |b, pattern| {
                    b.iter(|| {
                        let res = compile(pattern);
                        assert!(res.is_ok())
                    })
                },
            );
        })
}

pub fn nested_group_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested group compilation comparison");

    (1..8)
        .map(|exponent| 2usize.pow(exponent))
        .map(|depth| (format!("{}a{}", "(".repeat(depth), ")*".repeat(depth)), depth))
        .for_each(|(pattern, depth)| {
            group.bench_with_input(BenchmarkId::new("nesting depth of", depth), &pattern, |b, pattern| {
                b.iter(|| {
                    let res = compile(pattern);
                    assert!(res.is_ok())
                })
            });
        })
}

criterion_group!(benches, exponential_pattern_size_comparison, nested_group_comparison);
criterion_main!(benches);
