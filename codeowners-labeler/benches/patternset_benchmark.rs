use codeowners_labeler::{LabelMap, Resolver, Rule, RuleSet};
use criterion::{criterion_group, criterion_main, Criterion};

const TEST_PATHS: &[&str] = &[
    "file-a",
    "dir-a/file-a",
    "dir-a/dir-c/file-a",
    "dir-a/dir-c/file-b.rs",
    "dir-b/file-a.md",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

const TEST_PATTERNS: &[&str] = &[
    "*",
    "*-a",
    "*.md",
    "/dir-b",
    "/dir-a/dir-b/",
    "/**/dir-*/file-*",
    "/dir-*/*.rs",
    "/dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

fn build_ruleset(patterns: &[&str]) -> RuleSet {
    patterns
        .iter()
        .enumerate()
        .map(|(idx, &pattern)| Rule::new(pattern, vec![format!("@org/team-{}", idx)], idx + 1))
        .collect()
}

fn patternset_benchmark(c: &mut Criterion) {
    c.bench_function("building", |b| b.iter(|| build_ruleset(TEST_PATTERNS)));

    let ruleset = build_ruleset(TEST_PATTERNS);
    c.bench_function("matching", |b| {
        b.iter(|| {
            for p in TEST_PATHS {
                ruleset.winning_rule(p);
            }
        })
    });

    c.bench_function("batch matching", |b| b.iter(|| ruleset.winning_rules(TEST_PATHS)));

    let resolver = Resolver::new(LabelMap::new()).with_default_labels(true);
    c.bench_function("resolving", |b| {
        b.iter(|| resolver.labels_for(&ruleset, TEST_PATHS))
    });
}

criterion_group!(benches, patternset_benchmark);
criterion_main!(benches);
