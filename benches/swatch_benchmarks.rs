use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use swatch_core::{compile, lexer::scan, parser::parse};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

const TINY_SWATCH: &str = r#"theme t: { value: 42 };"#;

const SMALL_SWATCH: &str = r#"
let accent: #3366ff;
theme light: {
    background: #ffffff,
    foreground: #111111,
    accent: accent
};
"#;

const MEDIUM_SWATCH: &str = r#"
let palette: {
    grays: [#000000..#ffffff^8],
    blues: [#001133..#3366ff^5:FLAT]
};
let spacing: [0, 2..16^8];

theme light: {
    background: palette.grays[7];
    foreground: palette.grays[0];
    accent: palette.blues;
    spacing: spacing
};

theme dark: {
    background: palette.grays[0];
    foreground: palette.grays[7];
    spacing: spacing
};

font body: { family: "Inter", weights: [4, 7], style: ['normal', 'italic'] } from "fonts/inter.ttf";
"#;

const LARGE_SWATCH: &str = r#"
~ Shared values
let base: {
    unit: 4,
    radius: [0, 2, 4, 8],
    scale: [1...10],
    colors: {
        red: #ff0000, green: #00ff00, blue: #0000ff,
        black: #000, white: #fff
    }
};
let ramp: [#000000..#ffffff^16];
let key: 'blue';

theme light: {
    background: base.colors.white;
    surface: ramp[0];
    primary: base.colors[key];
    radius: base.radius;
    scale: base.scale;
    sizes: [base.unit..64^16];
    shadows: { small: ramp, large: [ramp, ramp] }
};

theme dark: {
    background: base.colors.black;
    primary: base.colors.red;
    radius: base.radius;
    sizes: [0...64^32];
    ramp: [#101010..#f0f0f0^12]
};

theme contrast: {
    background: #000;
    foreground: #fff;
    outline: [#ff0..#0ff^4];
    sizes: [1..100]
};

font body: { family: "Inter", weights: [1..9], style: ['all'] } from "fonts/inter.ttf";
font mono: { family: "Mono", weights: [4], style: 'normal' } from "fonts/mono.ttf";
font display: { family: "Display", weights: [7, 8, 9] };
"#;

// Identifiers cannot contain digits, so theme names are spelled in letters
fn theme_name(mut i: usize) -> String {
    let mut name = String::from("t_");
    loop {
        name.push(char::from(b'a' + (i % 26) as u8));
        i /= 26;
        if i == 0 {
            return name;
        }
    }
}

// Generates a document with `count` themes sharing one palette
fn generate_xlarge_swatch(count: usize) -> String {
    let mut source = String::from("let palette: { grays: [#000..#fff^10], steps: [0..20] };\n");
    for i in 0..count {
        source.push_str(&format!(
            "theme {}: {{ background: palette.grays[{}], steps: palette.steps, id: {i} }};\n",
            theme_name(i),
            i % 10
        ));
    }
    source
}

// ============================================================================
// Scanner Benchmarks
// ============================================================================

fn bench_scan_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_by_size");

    for (name, source) in [
        ("tiny", TINY_SWATCH),
        ("small", SMALL_SWATCH),
        ("medium", MEDIUM_SWATCH),
        ("large", LARGE_SWATCH),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| scan(black_box(src)))
        });
    }

    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parse_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_by_size");

    for (name, source) in [
        ("small", SMALL_SWATCH),
        ("medium", MEDIUM_SWATCH),
        ("large", LARGE_SWATCH),
    ] {
        let (tokens, _) = scan(source);
        group.throughput(Throughput::Elements(tokens.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &tokens, |b, tokens| {
            b.iter(|| parse(black_box(tokens)))
        });
    }

    group.finish();
}

// ============================================================================
// End-to-End Benchmarks
// ============================================================================

fn bench_compile_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_by_size");

    for (name, source) in [
        ("tiny", TINY_SWATCH),
        ("small", SMALL_SWATCH),
        ("medium", MEDIUM_SWATCH),
        ("large", LARGE_SWATCH),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| compile(black_box(src)))
        });
    }

    group.finish();
}

fn bench_compile_with_serialization(c: &mut Criterion) {
    c.bench_function("compile_large_to_json", |b| {
        b.iter(|| {
            let compilation = compile(black_box(LARGE_SWATCH));
            compilation.to_json()
        })
    });
}

fn bench_compile_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_theme_scaling");

    for count in [10, 50, 100, 500] {
        let source = generate_xlarge_swatch(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, src| {
            b.iter(|| compile(black_box(src)))
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(scan_benches, bench_scan_sizes);
criterion_group!(parse_benches, bench_parse_sizes);
criterion_group!(
    compile_benches,
    bench_compile_sizes,
    bench_compile_with_serialization,
    bench_compile_scaling
);

criterion_main!(scan_benches, parse_benches, compile_benches);
