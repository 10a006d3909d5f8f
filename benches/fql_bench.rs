use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fql_subscriptions::lexer::tokenize;
use fql_subscriptions::normalize::normalize;
use fql_subscriptions::{generate_fql, parse_fql, validate, SubscriptionConfig, SubscriptionSet};
use serde_json::json;
use std::hint::black_box;

fn test_cases() -> Vec<(&'static str, &'static str)> {
    vec![
        ("simple", r#"type = "track""#),
        ("medium", r#"type = "track" and event = "Order Completed" and properties.total >= 100"#),
        (
            "complex",
            r#"(type = "track" or type = "page") and (contains(event, "Checkout") or (match(context.page.path, "/cart*") and !contains(traits.email, "@example.com"))) and userId != null"#,
        ),
    ]
}

// Tokenize plus normalize, the parser's input
fn benchmark_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for (name, fql) in test_cases() {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &fql, |b, &fql| {
            b.iter(|| black_box(normalize(&tokenize(black_box(fql)))))
        });
    }

    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, fql) in test_cases() {
        group.bench_with_input(BenchmarkId::new("parse_fql", name), &fql, |b, &fql| {
            b.iter(|| black_box(parse_fql(black_box(fql))))
        });
    }

    group.finish();
}

fn benchmark_validate(c: &mut Criterion) {
    let event = json!({
        "type": "track",
        "event": "Checkout Started",
        "userId": "u-42",
        "properties": { "total": 120 },
        "traits": { "email": "someone@shop.test" },
        "context": { "page": { "path": "/cart/summary" } }
    });

    let mut group = c.benchmark_group("validate");

    for (name, fql) in test_cases() {
        let subscription = parse_fql(fql);
        group.bench_with_input(BenchmarkId::new("validate", name), &subscription, |b, subscription| {
            b.iter(|| black_box(validate(black_box(subscription), black_box(&event))))
        });
    }

    group.finish();
}

fn benchmark_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for (name, fql) in test_cases() {
        let subscription = parse_fql(fql);
        group.bench_with_input(BenchmarkId::new("generate_fql", name), &subscription, |b, subscription| {
            b.iter(|| black_box(generate_fql(black_box(subscription))))
        });
    }

    group.finish();
}

fn benchmark_end_to_end(c: &mut Criterion) {
    let subscriptions = test_cases()
        .into_iter()
        .map(|(name, fql)| SubscriptionConfig::new(name, fql))
        .collect();
    let set = SubscriptionSet::new(subscriptions, &Default::default());
    let events: Vec<_> = (0..100)
        .map(|i| {
            let kind = if i % 2 == 0 { "track" } else { "page" };
            let user_id = if i % 3 == 0 { json!(null) } else { json!(format!("u-{i}")) };
            json!({
                "type": kind,
                "event": format!("Checkout Step {i}"),
                "userId": user_id,
                "properties": { "total": i * 10 }
            })
        })
        .collect();

    c.bench_function("end_to_end_route_100_events", |b| {
        b.iter(|| {
            for event in &events {
                black_box(set.route(black_box(event)));
            }
        })
    });

    c.bench_function("end_to_end_parse_and_validate", |b| {
        b.iter(|| {
            for (_, fql) in test_cases() {
                let subscription = parse_fql(black_box(fql));
                black_box(validate(&subscription, &events[1]));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_tokenize,
    benchmark_parse,
    benchmark_validate,
    benchmark_generate,
    benchmark_end_to_end
);
criterion_main!(benches);
