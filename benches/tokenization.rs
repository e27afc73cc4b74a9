use base64::{engine::general_purpose::STANDARD, Engine as _};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tiktoken_core::{pattern, AllowedSpecial, Encoding, Vocabulary};

fn synthetic_encoding() -> Encoding {
    let mut lines = Vec::new();
    for b in 0u8..=255 {
        lines.push(format!("{} {}", STANDARD.encode([b]), b as u32));
    }
    let mut rank = 256u32;
    for word in ["Hello", "world", " world", " Hello", "This", "is", "test"] {
        lines.push(format!("{} {}", STANDARD.encode(word.as_bytes()), rank));
        rank += 1;
    }
    let vocab = Vocabulary::from_tiktoken_bytes(lines.join("\n").as_bytes()).unwrap();
    let mut specials = std::collections::HashMap::new();
    specials.insert("<|endoftext|>".to_string(), rank);
    let vocab = vocab.with_specials(specials).unwrap();
    let patterns = pattern::PatternSet::compile(
        pattern::CL100K_PATTERN,
        vec!["<|endoftext|>".to_string()].into_iter(),
    )
    .unwrap();
    Encoding::new("bench_synthetic", vocab, patterns)
}

fn bench_encode(c: &mut Criterion) {
    let enc = synthetic_encoding();
    let mut group = c.benchmark_group("encode");

    for size in &[10, 100, 1000] {
        let text = "Hello world ".repeat(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| enc.encode(black_box(&text), &AllowedSpecial::All));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let enc = synthetic_encoding();
    let ids: Vec<u32> = (0..1000).map(|i| i % enc.n_vocab() as u32).collect();

    c.bench_function("decode_1000_tokens", |b| {
        b.iter(|| enc.decode(black_box(&ids)));
    });
}

fn bench_encode_ordinary(c: &mut Criterion) {
    let enc = synthetic_encoding();
    let text = "This is test Hello world ".repeat(200);

    c.bench_function("encode_ordinary", |b| {
        b.iter(|| enc.encode_ordinary(black_box(&text)));
    });
}

fn bench_encode_batch(c: &mut Criterion) {
    let enc = synthetic_encoding();
    let mut group = c.benchmark_group("encode_batch");

    for batch_size in &[1, 10, 100] {
        let texts: Vec<String> = (0..*batch_size)
            .map(|i| format!("This is test string number {i} with some content"))
            .collect();
        let text_refs: Vec<&str> = texts.iter().map(std::string::String::as_str).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, _| {
                b.iter(|| enc.encode_batch(black_box(&text_refs), &AllowedSpecial::All));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_encode_ordinary,
    bench_encode_batch
);
criterion_main!(benches);
