//! Criterion benchmarks for the Agora relevance engine.
//!
//! Covers the major pipeline stages:
//! - Text analysis and tokenization
//! - Query understanding (entities, intent, expansion, synthesis)
//! - Score normalization and merge ordering
//! - Facet aggregation (sequential and parallel)
//! - End-to-end engine search

use agora::analysis::QueryAnalyzer;
use agora::cli::commands::sample_catalog;
use agora::config::{EngineConfig, FacetConfig};
use agora::document::{Document, EntityKind};
use agora::scoring::normalize::{ScoredResult, normalize_scores};
use agora::scoring::personalize::NoProfiles;
use agora::search::engine::SearchEngine;
use agora::search::facet::FacetAggregator;
use agora::search::gateway::{MemoryIndexGateway, RawHit};
use agora::search::request::{EntityScope, MultiEntitySearchRequest};
use agora::understanding::entity::EntityExtractor;
use agora::understanding::understander::QueryUnderstander;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Generate marketplace-flavored queries for benchmarking.
fn generate_test_queries(count: usize) -> Vec<String> {
    let heads = [
        "sustainable",
        "organic",
        "vegan",
        "recycled",
        "handmade",
        "fair trade",
        "local",
        "premium",
        "affordable",
        "best rated",
    ];
    let items = [
        "dress",
        "t-shirt",
        "jeans",
        "bags",
        "coffee",
        "toothbrush",
        "jewelry",
        "skincare",
        "cleaning products",
        "socks",
    ];
    let tails = [
        "",
        " under $100",
        " under $50",
        " size 32",
        " with good reviews",
        " by eco collective",
        " sorted by price low to high",
    ];

    let mut queries = Vec::with_capacity(count);
    for i in 0..count {
        let head = heads[(i * 7) % heads.len()];
        let item = items[(i * 13) % items.len()];
        let tail = tails[(i * 3) % tails.len()];
        queries.push(format!("{head} {item}{tail}"));
    }
    queries
}

/// Generate a synthetic catalog for benchmarking.
fn generate_catalog(count: usize) -> Vec<Document> {
    let categories = [
        "dresses",
        "shirts",
        "jeans",
        "bags",
        "coffee",
        "toothbrushes",
        "jewelry",
        "skincare",
        "cleaning",
        "shoes",
    ];
    let values = [
        "sustainable",
        "organic",
        "vegan",
        "recycled",
        "handmade",
        "fair trade",
        "local",
    ];
    let brands = [
        "EverGreen Basics",
        "Eco Collective",
        "Blue Loop",
        "Studio Luz",
        "Pure Home",
        "Botanica",
    ];
    let colors = ["black", "white", "blue", "green", "red"];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let kind = match i % 10 {
            8 => EntityKind::Brand,
            9 => EntityKind::Merchant,
            _ => EntityKind::Product,
        };
        let category = categories[(i * 7) % categories.len()];
        let value = values[(i * 13) % values.len()];
        let brand = brands[(i * 3) % brands.len()];
        let color = colors[(i * 11) % colors.len()];

        let mut builder = Document::builder(kind)
            .id(format!("doc-{i}"))
            .name(format!("{value} {category} {i}"))
            .description(format!(
                "A {value} {color} item from the {category} range, offered by {brand}"
            ))
            .category(category)
            .value(value)
            .color(color)
            .rating(3.0 + ((i * 17) % 20) as f32 / 10.0)
            .review_count(((i * 31) % 2000) as u64);
        if kind == EntityKind::Product {
            builder = builder
                .brand(brand)
                .price(5.0 + ((i * 23) % 200) as f64);
        }
        documents.push(builder.build());
    }
    documents
}

/// Scored results with a contrived spread of raw scores and types.
fn generate_scored_results(count: usize) -> Vec<ScoredResult> {
    generate_catalog(count)
        .into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let hit = RawHit {
                entity_type: doc.entity_type,
                entity_id: doc.id.clone(),
                raw_score: 0.5 + ((i * 19) % 100) as f32 / 25.0,
                source: doc,
            };
            ScoredResult::from_hit(hit, i)
        })
        .collect()
}

/// Benchmark text analysis and tokenization.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");

    let analyzer = QueryAnalyzer::new();
    let queries = generate_test_queries(1000);

    group.bench_function("analyze_single_query", |b| {
        b.iter(|| {
            let result = analyzer.analyze(black_box(&queries[0]));
            black_box(result)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("analyze_batch_queries", |b| {
        b.iter(|| {
            for query in queries.iter().take(100) {
                let result = analyzer.analyze(black_box(query));
                let _ = black_box(result);
            }
        })
    });

    group.finish();
}

/// Benchmark the full query understanding pipeline.
fn bench_query_understanding(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_understanding");

    let understander = QueryUnderstander::new();
    let extractor = EntityExtractor::new();
    let queries = generate_test_queries(1000);

    group.bench_function("understand_single_query", |b| {
        b.iter(|| {
            let result = understander.process(black_box("sustainable dress under $100"));
            black_box(result)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("understand_batch_queries", |b| {
        b.iter(|| {
            for query in queries.iter().take(100) {
                let result = understander.process(black_box(query));
                let _ = black_box(result);
            }
        })
    });

    group.bench_function("extract_entities_single_query", |b| {
        b.iter(|| {
            let result = extractor.extract(black_box("black dress size 8 under $100"));
            black_box(result)
        })
    });

    group.finish();
}

/// Benchmark score normalization and merge ordering.
fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    for size in [100usize, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("normalize_and_merge_{size}_results"), |b| {
            b.iter_with_setup(
                || generate_scored_results(size),
                |mut results| {
                    normalize_scores(&mut results);
                    black_box(results);
                },
            )
        });
    }

    group.finish();
}

/// Benchmark facet aggregation below and above the parallel threshold.
fn bench_facets(c: &mut Criterion) {
    let mut group = c.benchmark_group("facets");
    group.sample_size(30);

    let aggregator = FacetAggregator::new(FacetConfig::default());
    let small = generate_catalog(200);
    let large = generate_catalog(2000);

    group.throughput(Throughput::Elements(small.len() as u64));
    group.bench_function("aggregate_sequential_200_docs", |b| {
        b.iter(|| {
            let counts = aggregator.aggregate(black_box(&small));
            black_box(counts)
        })
    });

    group.throughput(Throughput::Elements(large.len() as u64));
    group.bench_function("aggregate_parallel_2000_docs", |b| {
        b.iter(|| {
            let counts = aggregator.aggregate(black_box(&large));
            black_box(counts)
        })
    });

    group.finish();
}

/// Benchmark the engine end to end over the built-in sample catalog.
fn bench_engine_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_search");
    group.sample_size(50);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let gateway = MemoryIndexGateway::with_documents(sample_catalog());
    let engine = SearchEngine::new(gateway, NoProfiles, EngineConfig::default()).unwrap();

    let plain = MultiEntitySearchRequest::new("sustainable dress").with_scope(EntityScope::All);
    let with_nlp = MultiEntitySearchRequest::new("sustainable dress under $100")
        .with_scope(EntityScope::All)
        .with_nlp(true)
        .with_highlighting(true);

    group.bench_function("search_all_scopes", |b| {
        b.iter(|| {
            let response = runtime.block_on(engine.search(black_box(&plain)));
            black_box(response)
        })
    });

    group.bench_function("search_all_scopes_with_nlp", |b| {
        b.iter(|| {
            let response = runtime.block_on(engine.search(black_box(&with_nlp)));
            black_box(response)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_text_analysis,
    bench_query_understanding,
    bench_scoring,
    bench_facets,
    bench_engine_search
);

criterion_main!(benches);
