//! Benchmarks for streaming annotation injection.
//!
//! Benchmark groups:
//! - `inject_throughput`: whole-document injection at various page counts
//! - `inject_buffer`: the same document through different buffer capacities

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use psmark_core::{AnnotationInjector, AnnotationTable, InjectOptions};

/// Generate a synthetic PostScript document with `pages` pages.
fn generate_document(pages: usize) -> Vec<u8> {
    let mut data = b"%!PS-Adobe-3.0\n<< /PageSize [612 792] >> setpagedevice\n".to_vec();
    for page in 0..pages {
        data.extend_from_slice(format!("%%Page: {} {}\n", page + 1, page + 1).as_bytes());
        for line in 0..40 {
            data.extend_from_slice(
                format!("72 {} moveto (line {line} of page {page}, not a showpage) show\n", 700 - line * 15)
                    .as_bytes(),
            );
        }
        data.extend_from_slice(b"showpage\n");
    }
    data.extend_from_slice(b"%%EOF\n");
    data
}

/// Annotate every other page with two links.
fn generate_table(pages: usize) -> AnnotationTable {
    let mut json = String::from("{");
    for page in (0..pages).step_by(2) {
        if page > 0 {
            json.push(',');
        }
        json.push_str(&format!(
            r#""{page}": {{"mediabox": [0, 0, 595, 842], "urls": [
                {{"data": "/URI (a)", "rect": [10, 10, 100, 30]}},
                {{"data": "/URI (b)", "rect": [10, 40, 100, 60]}}]}}"#
        ));
    }
    json.push('}');
    AnnotationTable::from_json(&json).unwrap()
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("inject_throughput");

    for pages in [10, 100, 1_000] {
        let data = generate_document(pages);
        let table = generate_table(pages);
        let injector = AnnotationInjector::new(&table);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("pages", pages), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::with_capacity(data.len() + pages * 256);
                injector.inject(black_box(&data[..]), &mut out).unwrap();
                out.len()
            })
        });
    }

    group.finish();
}

fn bench_buffer_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("inject_buffer");
    let pages = 200;
    let data = generate_document(pages);
    let table = generate_table(pages);

    for capacity in [4 * 1024, 64 * 1024, 4096 * 1024] {
        let options = InjectOptions {
            buffer_capacity: capacity,
            ..Default::default()
        };
        let injector = AnnotationInjector::with_options(&table, options).unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("capacity", capacity), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::with_capacity(data.len() + pages * 256);
                injector.inject(black_box(&data[..]), &mut out).unwrap();
                out.len()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput, bench_buffer_capacity);
criterion_main!(benches);
