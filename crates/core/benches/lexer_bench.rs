//! Benchmarks for tokenization and document parsing.
//!
//! Benchmark groups:
//! - `lexer_tokenize`: raw content-stream tokenization at various scales
//! - `document_parse`: lex + parse of a synthetic multi-page document

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use folio_core::document::{PDFDocument, ParseOptions};
use folio_core::parser::lex;

/// Generate a content stream with roughly `n` tokens.
fn generate_content(n: usize) -> Vec<u8> {
    let templates: &[&[u8]] = &[
        b"BT ",
        b"/F1 ",
        b"12 ",
        b"Tf ",
        b"100 700 Td ",
        b"(Hello World) ",
        b"Tj ",
        b"[(Kern) -120 (ed)] TJ ",
        b"<48454C4C4F> ",
        b"0.5 g ",
        b"ET ",
        b"q 1 0 0 1 72 720 cm Q ",
    ];
    let mut data = Vec::with_capacity(n * 8);
    for i in 0..n {
        data.extend_from_slice(templates[i % templates.len()]);
    }
    data
}

/// Generate a document with `pages` pages, each with its own content stream.
fn generate_document(pages: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n".to_vec();
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    data.extend_from_slice(
        format!(
            "2 0 obj << /Type /Pages /Kids [{}] /Count {pages} >> endobj\n",
            kids.join(" ")
        )
        .as_bytes(),
    );
    let content = generate_content(200);
    let content = content.trim_ascii();
    for i in 0..pages {
        let page = 3 + 2 * i;
        data.extend_from_slice(
            format!(
                "{page} 0 obj << /Type /Page /Parent 2 0 R /Contents {} 0 R >> endobj\n\
                 {} 0 obj << /Length {} >> stream\n",
                page + 1,
                page + 1,
                content.len()
            )
            .as_bytes(),
        );
        data.extend_from_slice(content);
        data.extend_from_slice(b"\nendstream\nendobj\n");
    }
    data.extend_from_slice(b"trailer << /Root 1 0 R >> startxref 0\n%%EOF\n");
    data
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_tokenize");
    for size in [1_000, 10_000, 100_000] {
        let data = generate_content(size);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(lex(black_box(data))));
        });
    }
    group.finish();
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_parse");
    for pages in [10, 100] {
        let data = generate_document(pages);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &data, |b, data| {
            b.iter(|| {
                let doc = PDFDocument::parse(black_box(data), &ParseOptions::default());
                black_box(doc.map(|d| d.len()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_document);
criterion_main!(benches);
