use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use mailsplit::config::StagingConfig;
use mailsplit::parser::mime::parse_message;
use mailsplit::parser::warning::StrictPolicy;
use mailsplit::pipeline::{run, RunOptions};
use mailsplit::split::classify;

fn load_fixture() -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("multipart_attachments.eml");
    std::fs::read(path).unwrap()
}

fn bench_parse_and_classify(c: &mut Criterion) {
    let raw = load_fixture();

    c.bench_function("parse_and_classify", |b| {
        b.iter(|| {
            let parsed = parse_message(&raw, &mut StrictPolicy::new()).unwrap();
            let tree = parsed.tree();
            classify(&tree).len()
        })
    });
}

fn bench_full_run(c: &mut Criterion) {
    let raw = load_fixture();
    let options = RunOptions {
        boundary: "bench-boundary".to_string(),
        request_json: r#"{"filename":"mail.eml","languageCode":"en","metadata":{}}"#.to_string(),
        staging: StagingConfig::default(),
    };

    c.bench_function("split_multipart_message", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(4096);
            run(&options, &raw[..], &mut out);
            out.len()
        })
    });
}

criterion_group!(benches, bench_parse_and_classify, bench_full_run);
criterion_main!(benches);
