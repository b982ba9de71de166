//! Routing and planning benchmarks
//!
//! Measures the non-I/O parts of a turn: building the router prompt, parsing
//! the router's answer, synthesizing the planning instruction and loading
//! configuration. Network calls are excluded.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use study_partner::{
    config::Config,
    conversation::Message,
    planning::{ClarificationPlan, FocusArea, LearningGoal},
    router::TopicRouter,
};

/// Prompt construction for short and long context messages
fn bench_router_prompt(c: &mut Criterion) {
    let long_reply = "Speciation is the evolutionary process by which populations evolve to \
                      become distinct species. "
        .repeat(40);
    let cases = vec![
        (
            "short_context",
            vec![
                Message::user("What is Speciation?"),
                Message::assistant("Speciation is the formation of new species."),
            ],
        ),
        (
            "long_context",
            vec![Message::user("What is Speciation?"), Message::assistant(long_reply)],
        ),
    ];

    let mut group = c.benchmark_group("router_prompt");

    for (name, context) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &context, |b, ctx| {
            b.iter(|| TopicRouter::build_router_prompt(black_box(ctx), "Give me an example"));
        });
    }

    group.finish();
}

/// Classification parsing for typical model answers
fn bench_parse_classification(c: &mut Criterion) {
    let responses = vec![
        ("new", "NEW"),
        ("continuation", "CONTINUATION"),
        ("padded", "  continuation.\n"),
        ("garbage", "I think this is probably related"),
    ];

    let mut group = c.benchmark_group("parse_classification");

    for (name, response) in responses {
        group.bench_with_input(BenchmarkId::from_parameter(name), &response, |b, r| {
            b.iter(|| TopicRouter::parse_classification(black_box(r)));
        });
    }

    group.finish();
}

/// Instruction synthesis from a filled-in plan
fn bench_synthesize_instruction(c: &mut Criterion) {
    let plan = ClarificationPlan::new(LearningGoal::DetailedExplanation)
        .with_focus(FocusArea::CoreDefinitions)
        .with_focus(FocusArea::ConcreteExample)
        .with_other("real-world cases")
        .with_confusion("I don't get how isolation leads to new species");

    c.bench_function("synthesize_instruction", |b| {
        b.iter(|| plan.synthesize_instruction(black_box("What is Speciation?")));
    });
}

/// Configuration parsing and validation, done once at startup
fn bench_config_parsing(c: &mut Criterion) {
    let toml_str = r#"
[provider]
base_url = "https://api.groq.com/openai/v1"
model = "llama-3.3-70b-versatile"

[router]
context_window = 2
max_tokens = 5

[session]
condition = "planning_intervention"
"#;

    c.bench_function("config_parsing", |b| {
        b.iter(|| black_box(toml_str).parse::<Config>());
    });
}

criterion_group!(
    benches,
    bench_router_prompt,
    bench_parse_classification,
    bench_synthesize_instruction,
    bench_config_parsing,
);
criterion_main!(benches);
