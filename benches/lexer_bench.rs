//! Lexer benchmarks using criterion.
//!
//! Run with: cargo bench --bench lexer_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tsppc::diagnostics::ErrorReporter;
use tsppc::{Lexer, TokenKind};

/// A representative TSPP source for end-to-end lexing.
const PROGRAM_SOURCE: &str = r#"
enum Mode : int { Idle = 0, Busy = 1 }

class Task {
    private let id: int = 0;
    constructor(id: int) {
        this.id = id;
    }
    get identifier(): int {
        return this.id;
    }
}

function clamp(value: int, low: int, high: int): int {
    if (value < low) { return low; }
    if (value > high) { return high; }
    return value;
}

#heap let scores: int[] = [3, 9, 27];
let total = 0;
for (const score of scores) {
    total += clamp(score, 0, 10);
}
"#;

/// Operator-dense source exercising longest-match scanning.
const OPERATOR_SOURCE: &str = r#"
a >>>= b; a >>= b; a <<= b; a += b; a -= b; a *= b; a /= b; a %= b;
x = a >>> b >> c << d; y = a && b || !c; z = a & b | c ^ ~d;
p = a <= b >= c < d > e == f != g;
"#;

/// Statement-per-line source exercising semicolon insertion.
const ASI_SOURCE: &str = r#"
let a = 1
let b = a + 2
let c = b * 3
let d = c - 4
let e = d / 5
"#;

/// Literal-heavy source.
const LITERAL_SOURCE: &str = r#"
42; 3.25; 2.5e10; 1e-5; "hello"; "escape\n\t"; 'a'; '\n'; true; false; null;
"#;

fn lex_to_kinds(source: &str) -> Vec<TokenKind> {
    let mut reporter = ErrorReporter::new();
    Lexer::new(source, "bench.tspp", &mut reporter)
        .tokenize()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    for (name, source) in [
        ("program", PROGRAM_SOURCE),
        ("operators", OPERATOR_SOURCE),
        ("asi", ASI_SOURCE),
        ("literals", LITERAL_SOURCE),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, source.len()), source, |b, source| {
            b.iter(|| lex_to_kinds(black_box(source)));
        });
    }

    group.finish();
}

fn bench_lexer_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_scaling");

    for repeat in [8usize, 64, 256] {
        let source = PROGRAM_SOURCE.repeat(repeat);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(repeat),
            &source,
            |b, source| {
                b.iter(|| lex_to_kinds(black_box(source)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_lexer_scaling);
criterion_main!(benches);
