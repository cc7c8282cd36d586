//! Benchmarks for hierarchy construction, projection and validity.

use std::fmt::Write;
use std::sync::Arc;

use arbor_store::UnitStore;
use arbor_store_yaml::YamlStore;
use arbor_tree::projection::{ListProjection, reference_groups};
use arbor_tree::{
    BrowseOptions, HierarchyBrowser, RenderMode, TreeBuilder, TreeCache, ValidityAccumulator,
    ValidityOptions,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Create a hierarchy document with specified depth and breadth.
///
/// Every group holds `breadth` leaves and `breadth` sub-groups down to `depth`.
fn create_hierarchy(depth: usize, breadth: usize) -> String {
    fn write_group(
        out: &mut String,
        handle: &str,
        indent: usize,
        level: usize,
        max: usize,
        breadth: usize,
    ) {
        let pad = " ".repeat(indent);
        let _ = writeln!(out, "{pad}- handle: \"{handle}\"");
        let _ = writeln!(out, "{pad}  name: \"Group {handle}\"");
        let _ = writeln!(out, "{pad}  leaves:");
        for i in 0..breadth {
            let _ = writeln!(
                out,
                "{pad}    - {{ handle: \"{handle}.l{i}\", name: \"Leaf {i}\", items: {i} }}"
            );
        }
        if level < max {
            let _ = writeln!(out, "{pad}  groups:");
            for i in 0..breadth {
                let child = format!("{handle}.g{i}");
                write_group(out, &child, indent + 4, level + 1, max, breadth);
            }
        }
    }

    let mut out = String::from("groups:\n");
    for i in 0..breadth {
        write_group(&mut out, &format!("g{i}"), 2, 1, depth, breadth);
    }
    out
}

fn store(depth: usize, breadth: usize) -> Arc<YamlStore> {
    Arc::new(YamlStore::from_yaml(&create_hierarchy(depth, breadth)).unwrap())
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for (depth, breadth) in [(2, 5), (3, 4), (4, 3)] {
        let store = store(depth, breadth);
        let roots = store.top_level_groups().unwrap();

        group.bench_with_input(
            BenchmarkId::new("full_depth", format!("d{depth}_b{breadth}")),
            &roots,
            |b, roots| b.iter(|| TreeBuilder::default().build(&*store, roots.clone())),
        );
        group.bench_with_input(
            BenchmarkId::new("exclude_leaves", format!("d{depth}_b{breadth}")),
            &roots,
            |b, roots| b.iter(|| TreeBuilder::new(999, true).build(&*store, roots.clone())),
        );
    }

    group.finish();
}

fn bench_projections(c: &mut Criterion) {
    let store = store(4, 4);
    let mut cache = TreeCache::new(store, TreeBuilder::default());
    let tree = cache.get_or_build(None).unwrap().clone();

    let mut group = c.benchmark_group("projection");

    group.bench_function("references", |b| {
        b.iter(|| reference_groups(&tree))
    });

    let list = ListProjection::new("/repo");
    group.bench_function("list", |b| {
        b.iter(|| list.project("hierarchy-browser", &tree))
    });

    group.finish();
}

fn bench_validity(c: &mut Criterion) {
    let store = store(4, 4);
    let shared = Arc::clone(&store);
    let mut cache = TreeCache::new(shared, TreeBuilder::default());
    let tree = cache.get_or_build(None).unwrap().clone();

    let mut group = c.benchmark_group("validity");

    let plain = ValidityOptions::default();
    group.bench_function("identity_tokens", |b| {
        b.iter(|| ValidityAccumulator::new(&plain).accumulate(&tree).etag())
    });

    let counted = ValidityOptions {
        count_items: true,
        assumed_valid: None,
    };
    group.bench_function("with_item_counts", |b| {
        b.iter(|| {
            ValidityAccumulator::new(&counted)
                .with_counter(Some(&*store))
                .accumulate(&tree)
                .etag()
        })
    });

    group.finish();
}

fn bench_browser_request(c: &mut Criterion) {
    let store = store(3, 4);

    let mut group = c.benchmark_group("browser");

    for (label, mode) in [("full", RenderMode::Full), ("list", RenderMode::List)] {
        let options = BrowseOptions {
            mode,
            ..BrowseOptions::default()
        };
        group.bench_function(label, |b| {
            b.iter_with_setup(
                || {
                    let shared = Arc::clone(&store);
                    HierarchyBrowser::new(shared, options.clone())
                },
                |mut view| {
                    let _ = view.validity();
                    view.body()
                },
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_projections,
    bench_validity,
    bench_browser_request,
);
criterion_main!(benches);
