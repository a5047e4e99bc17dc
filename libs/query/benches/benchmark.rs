//! Criterion benchmarks for query compilation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solrq_query::functions::{self, Operand};
use solrq_query::{
    CalculatedField, Criteria, Direction, Distance, FacetOptions, GroupOptions, Node, Point,
    Query, QueryCompiler, RenderContext, Sort,
};
use std::time::Duration;

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .warm_up_time(Duration::from_millis(100))
        .measurement_time(Duration::from_secs(1))
        .nresamples(1000)
        .noise_threshold(0.05)
}

fn c(field: &str) -> Criteria {
    Criteria::where_field(field).unwrap_or_else(|e| panic!("invalid field: {}", e))
}

fn build_query() -> Query {
    let criteria = Node::from(c("title").is("rust programming"))
        .and(c("price").between(10, 50, true, false))
        .or(Node::from(c("author").starts_with("kla").unwrap()).and(c("year").greater_than(2015)))
        .and(
            c("store")
                .within(Point::new(45.15, -93.85), Distance::kilometers(5.0))
                .unwrap(),
        );

    Query::new(criteria)
        .add_filter_query(c("inStock").is(true))
        .add_calculated_field(CalculatedField::new(
            Some("score"),
            functions::product(Operand::field("price").unwrap())
                .times(0.8)
                .build(),
        ))
        .add_sort(Sort::by("price", Direction::Asc).unwrap())
        .set_group_options(GroupOptions::new().add_group_by_field("category").unwrap())
        .set_facet_options(FacetOptions::new().add_facet_on_field("author").unwrap())
}

fn bench_criteria_tree(c: &mut Criterion) {
    let compiler = QueryCompiler::default();
    let query = build_query();

    c.bench_function("query_string_from_tree", |b| {
        b.iter(|| {
            compiler
                .create_query_string_from_node(black_box(query.criteria()), &RenderContext::default())
                .unwrap()
        })
    });
}

fn bench_full_compile(c: &mut Criterion) {
    let compiler = QueryCompiler::default();
    let query = build_query();

    c.bench_function("compile_full_query", |b| {
        b.iter(|| compiler.compile(black_box(&query)).unwrap())
    });
}

fn bench_nested_functions(c: &mut Criterion) {
    let compiler = QueryCompiler::default();
    let mut function = functions::product(Operand::field("price").unwrap()).build();
    for _ in 0..10 {
        function = functions::product(function).times(1.5).build();
    }

    c.bench_function("nested_function_fragment", |b| {
        b.iter(|| {
            compiler
                .create_function_fragment(black_box(&function), 0, &RenderContext::default())
                .unwrap()
        })
    });
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_criteria_tree, bench_full_compile, bench_nested_functions
}
criterion_main!(benches);
