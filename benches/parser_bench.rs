//! Parser benchmarks using criterion.
//!
//! Run with: cargo bench --bench parser_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tsppc::ast::Program;
use tsppc::diagnostics::ErrorReporter;
use tsppc::parser::Parser;

/// A representative TSPP source mixing declarations and statements.
const PROGRAM_SOURCE: &str = r#"
enum Mode : int { Idle = 0, Busy = 1 }

interface Runnable {
    function run(): void;
}

class Task implements Runnable {
    private let id: int = 0;
    constructor(id: int) {
        this.id = id;
    }
    public function run(): void {
        this.id = this.id + 1;
    }
    get identifier(): int {
        return this.id;
    }
    set identifier(next: int) {
        this.id = next;
    }
}

function clamp(value: int, low: int, high: int): int {
    if (value < low) { return low; }
    if (value > high) { return high; }
    return value;
}

let total = 0;
for (let i = 0; i < 100; i = i + 1) {
    total += clamp(i, 0, 10);
}
"#;

/// Deeply nested expression source exercising the precedence climber.
const EXPRESSION_SOURCE: &str = r#"
let a = 1 + 2 * 3 - 4 / 5 % 6;
let b = (1 + 2) * ((3 - 4) / (5 + 6));
let c = x && y || !z && (p < q) == (r > s);
let d = bits << 2 >> 1 & mask | flags ^ toggles;
let e = cond ? deep ? 1 : 2 : other ? 3 : 4;
let f = obj.field[index](arg1, arg2).next@through;
"#;

fn parse_source(source: &str) -> Program {
    let mut reporter = ErrorReporter::new();
    let mut parser = Parser::from_source(source, "bench.tspp", &mut reporter);
    parser.parse_program()
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for (name, source) in [
        ("program", PROGRAM_SOURCE),
        ("expressions", EXPRESSION_SOURCE),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, source.len()), source, |b, source| {
            b.iter(|| parse_source(black_box(source)));
        });
    }

    group.finish();
}

fn bench_parser_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_scaling");

    for repeat in [8usize, 64, 256] {
        let source = PROGRAM_SOURCE.repeat(repeat);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(repeat),
            &source,
            |b, source| {
                b.iter(|| parse_source(black_box(source)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parser, bench_parser_scaling);
criterion_main!(benches);
