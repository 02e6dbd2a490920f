//! Performance benchmarks for term resolution
//!
//! Measures over a synthetic vocabulary:
//! - Turtle parsing through the parser registry
//! - Term resolution with and without a term selection graph
//! - Full one-shot generation from local files
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use vocabgen_core::{
    artifact::JsonRenderer,
    config::GeneratorConfig,
    graph::Graph,
    orchestrator::ArtifactOrchestrator,
    resolver::TermResolver,
    resource::{ReqwestTransport, PARSERS},
};

/// A vocabulary with `terms` classes and as many properties, each labelled in two languages.
fn synthetic_vocab(terms: usize) -> String {
    let mut ttl = String::from(
        "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n\
         @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
         @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
         @prefix ex: <http://bench.example.org/> .\n\
         ex: a owl:Ontology ; rdfs:comment \"Benchmark vocabulary\"@en .\n",
    );
    for i in 0..terms {
        ttl.push_str(&format!(
            "ex:Class{i} a rdfs:Class ; rdfs:label \"Class {i}\"@en, \"Classe {i}\"@fr ; \
             rdfs:comment \"Class number {i}\"@en .\n\
             ex:prop{i} a rdf:Property ; rdfs:label \"prop {i}\"@en ; rdfs:seeAlso ex:Class{i} .\n"
        ));
    }
    ttl
}

/// Selects every other class and adds a Spanish label.
fn synthetic_selection(terms: usize) -> String {
    let mut ttl = String::from(
        "@prefix schema: <https://schema.org/> .\n@prefix ex: <http://bench.example.org/> .\n",
    );
    for i in (0..terms).step_by(2) {
        ttl.push_str(&format!("ex:Class{i} schema:alternateName \"Clase {i}\"@es .\n"));
    }
    ttl
}

fn parse(ttl: &str) -> Graph {
    PARSERS
        .parse("bench.ttl", "text/turtle", ttl.as_bytes(), None)
        .unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_turtle");
    for terms in [100, 1000] {
        let ttl = synthetic_vocab(terms);
        group.bench_with_input(BenchmarkId::from_parameter(terms), &ttl, |b, ttl| {
            b.iter(|| parse(ttl))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_terms");
    for terms in [100, 1000] {
        let full = parse(&synthetic_vocab(terms));
        let selection = parse(&synthetic_selection(terms));
        let merged = full.merge(&selection);
        let resolver = TermResolver::default();

        group.bench_with_input(BenchmarkId::new("full", terms), &full, |b, full| {
            b.iter(|| resolver.resolve(full, &Graph::new()).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("selected", terms),
            &(merged, selection),
            |b, (merged, selection)| b.iter(|| resolver.resolve(merged, selection).unwrap()),
        );
    }
    group.finish();
}

fn setup_generation(terms: usize) -> (TempDir, GeneratorConfig) {
    let tempdir = TempDir::new().unwrap();
    let vocab: PathBuf = tempdir.path().join("bench.ttl");
    std::fs::write(&vocab, synthetic_vocab(terms)).unwrap();
    let mut config = GeneratorConfig::for_resources(
        vec![vocab.to_string_lossy().to_string()],
        None,
        tempdir.path().join("out"),
    );
    config.force = true;
    (tempdir, config)
}

fn bench_generate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_tempdir, config) = setup_generation(500);

    c.bench_function("generate_500_terms", |b| {
        b.to_async(&rt).iter(|| async {
            let mut orchestrator = ArtifactOrchestrator::new(
                config.clone(),
                Arc::new(ReqwestTransport::new(None).unwrap()),
                Arc::new(JsonRenderer),
            )
            .unwrap();
            orchestrator.generate().await.unwrap()
        });
    });
}

criterion_group!(benches, bench_parse, bench_resolve, bench_generate);
criterion_main!(benches);
