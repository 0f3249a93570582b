//! End-to-end conversion latency: parse, annotate and lower all three
//! phases, then emit the program text.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use automi::syntax::parse_block;
use automi::{convert_with_options, parse_program, ConvertOptions, Phase};

const SSSP: &str = include_str!("../demos/sssp.cpp");

/// A phase body with `n` sibling conditionals, each nesting one more.
fn synthetic_body(n: usize) -> String {
    let mut body = String::from("{\n");
    for i in 0..n {
        body.push_str(&format!(
            "  if (x{} < y) {{ z = z + {}; if (w) {{ context_signal_v_m(); }} }} else {{ z = 0; }}\n",
            i, i
        ));
    }
    body.push('}');
    body
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_program/sssp", |b| {
        b.iter(|| parse_program(black_box(SSSP)))
    });
}

fn bench_phase(c: &mut Criterion) {
    let options = ConvertOptions::default();
    let mut group = c.benchmark_group("convert_phase");
    for n in [10, 100] {
        let body = parse_block(&synthetic_body(n)).expect("synthetic body parses");
        let lowering = Phase::Scatter.lowering(&options, "msg");
        group.bench_function(format!("{}_conditionals", n), |b| {
            b.iter(|| automi::convert_phase(Phase::Scatter, black_box(&body), &lowering))
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let options = ConvertOptions::default();
    c.bench_function("convert/sssp", |b| {
        b.iter(|| convert_with_options(black_box(SSSP), "sssp.cpp", &options))
    });
}

criterion_group!(benches, bench_parse, bench_phase, bench_end_to_end);
criterion_main!(benches);
