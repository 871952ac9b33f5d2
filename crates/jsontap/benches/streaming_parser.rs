//! Benchmark – `jsontap::PushParser` and `jsontap::collect`
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jsontap::{EventRecorder, Listener, ParserOptions, PushParser, Scalar};

/// Produce a deterministic newline-delimited feed of `records` small status
/// documents, roughly what a social-media firehose delivers.
fn make_ndjson_payload(records: usize) -> String {
    let mut s = String::new();
    for i in 0..records {
        writeln!(
            s,
            r#"{{"id":{i},"user":{{"name":"user{i}","followers":{}}},"text":"status é number {i}","score":{}.5,"tags":["a","b"],"reply":null,"ok":true}}"#,
            i * 7,
            i % 100
        )
        .expect("writing to a String cannot fail");
    }
    s
}

/// Counts events without storing them, so the benchmark measures the
/// state machine rather than allocation in the listener.
#[derive(Default)]
struct Counter(usize);

impl Listener for Counter {
    fn start_object(&mut self) {
        self.0 += 1;
    }
    fn start_array(&mut self) {
        self.0 += 1;
    }
    fn key(&mut self, _key: &str) {
        self.0 += 1;
    }
    fn value(&mut self, _value: Scalar) {
        self.0 += 1;
    }
}

/// Feed the payload in `parts` pieces and return the number of events seen.
fn run_push_parser(payload: &str, parts: usize) -> usize {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts);
    let mut parser = PushParser::new(Counter::default(), ParserOptions::default());
    for chunk in payload.as_bytes().chunks(chunk_size) {
        parser.feed(chunk).unwrap();
    }
    parser.into_listener().0
}

fn bench_push_parser(c: &mut Criterion) {
    let payload = make_ndjson_payload(1_000);

    let mut group = c.benchmark_group("push_parser_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for &parts in &[1usize, 100, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| black_box(run_push_parser(black_box(&payload), parts)));
        });
    }
    group.finish();
}

fn bench_collect(c: &mut Criterion) {
    let payload = make_ndjson_payload(1_000);

    let mut group = c.benchmark_group("collect");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("jsontap", |b| {
        b.iter(|| {
            let values = jsontap::collect(black_box(payload.as_bytes()), ParserOptions::default())
                .unwrap();
            black_box(values.len())
        });
    });
    group.bench_function("jsontap_events", |b| {
        b.iter(|| {
            let mut parser = PushParser::new(EventRecorder::new(), ParserOptions::default());
            parser.feed(black_box(payload.as_bytes())).unwrap();
            black_box(parser.into_listener().events.len())
        });
    });
    group.bench_function("serde_json_stream", |b| {
        b.iter(|| {
            let count = serde_json::Deserializer::from_slice(black_box(payload.as_bytes()))
                .into_iter::<serde_json::Value>()
                .map(Result::unwrap)
                .count();
            black_box(count)
        });
    });
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(8));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_push_parser, bench_collect }
criterion_main!(benches);
