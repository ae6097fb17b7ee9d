//! Benchmarks for post index construction and queries.

use std::fs;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quill_posts::{ManagerConfig, PostManager};

/// Write `count` posts spread over consecutive days, grouped by year.
fn create_posts(root: &Path, count: usize) {
    for i in 0..count {
        let year = 2000 + i / 336;
        let month = (i / 28) % 12 + 1;
        let day = i % 28 + 1;
        let dir = root.join(year.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{year}-{month:02}-{day:02}-post-{i}.txt")),
            format!(
                "title: Post {i}\ntags: tag-{}, tag-{}\n\nBody of post {i}.\n",
                i % 7,
                i % 13
            ),
        )
        .unwrap();
    }
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for count in [100, 1000] {
        let temp_dir = tempfile::tempdir().unwrap();
        let posts_dir = temp_dir.path().join("posts");
        create_posts(&posts_dir, count);

        group.bench_with_input(BenchmarkId::new("no_cache", count), &count, |b, _| {
            let manager = PostManager::new(ManagerConfig::with_sources([&posts_dir])).unwrap();
            b.iter(|| {
                manager.invalidate();
                manager.index().unwrap()
            });
        });

        let cache_dir = temp_dir.path().join("cache");
        group.bench_with_input(BenchmarkId::new("file_cache", count), &count, |b, _| {
            let config = ManagerConfig {
                cache_dir: Some(cache_dir.clone()),
                ..ManagerConfig::with_sources([&posts_dir])
            };
            let manager = PostManager::new(config).unwrap();
            manager.index().unwrap();
            b.iter(|| {
                manager.invalidate();
                manager.index().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    create_posts(temp_dir.path(), 1000);
    let manager = PostManager::new(ManagerConfig::with_sources([temp_dir.path()])).unwrap();
    manager.index().unwrap();

    let mut group = c.benchmark_group("queries");

    group.bench_function("recent_posts_summary", |b| {
        b.iter(|| manager.recent_posts(10, 3, false).unwrap())
    });

    group.bench_function("get_post", |b| {
        b.iter(|| manager.get_post("2001/06/post-500").unwrap())
    });

    group.bench_function("tags", |b| b.iter(|| manager.tags().unwrap()));

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_queries);
criterion_main!(benches);
