use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use search_trees::{AvlTree, BinarySearchTree};
use std::collections::BTreeMap;

fn random_values(count: usize) -> Vec<u64> {
    let mut rng = thread_rng();
    let mut values: Vec<u64> = (0..count).map(|_| rng.r#gen()).collect();
    values.sort_unstable();
    values.dedup();
    values.shuffle(&mut rng);
    values
}

fn bench_avl_insert(c: &mut Criterion) {
    let values = random_values(10000);

    let mut group = c.benchmark_group("avl_insert");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("insert_10000_u64", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &value in &values {
                tree.insert(black_box(value));
            }
        })
    });
    group.bench_function("insert_10000_u64_sorted", |b| {
        let mut sorted = values.clone();
        sorted.sort_unstable();
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &value in &sorted {
                tree.insert(black_box(value));
            }
        })
    });
    group.finish();
}

fn bench_bst_insert(c: &mut Criterion) {
    let values = random_values(10000);

    let mut group = c.benchmark_group("bst_insert");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("insert_10000_u64", |b| {
        b.iter(|| {
            let mut tree = BinarySearchTree::new();
            for &value in &values {
                tree.insert(black_box(value));
            }
        })
    });
    group.finish();
}

fn bench_btreemap_insert(c: &mut Criterion) {
    let values = random_values(10000);

    let mut group = c.benchmark_group("btreemap_insert");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("insert_10000_u64_u64", |b| {
        b.iter(|| {
            let mut tree = BTreeMap::new();
            for &value in &values {
                tree.insert(value, black_box(value));
            }
        })
    });
    group.finish();
}

fn bench_avl_search(c: &mut Criterion) {
    let mut values = random_values(10000);
    let tree: AvlTree<u64> = values.iter().copied().collect();
    values.shuffle(&mut thread_rng());

    let mut group = c.benchmark_group("avl_search");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("search_10000_u64", |b| {
        b.iter(|| {
            for &value in &values {
                black_box(tree.find(&value));
            }
        })
    });
    group.bench_function("lower_bound_10000_u64", |b| {
        b.iter(|| {
            for &value in &values {
                black_box(tree.lower_bound(&value.saturating_sub(1), true));
            }
        })
    });
    group.finish();
}

fn bench_btreemap_search(c: &mut Criterion) {
    let mut values = random_values(10000);
    let tree: BTreeMap<u64, u64> = values.iter().map(|&v| (v, v)).collect();
    values.shuffle(&mut thread_rng());

    let mut group = c.benchmark_group("btreemap_search");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("search_10000_u64_u64", |b| {
        b.iter(|| {
            for &value in &values {
                black_box(tree.get(&value));
            }
        })
    });
    group.finish();
}

fn bench_avl_remove(c: &mut Criterion) {
    let values = random_values(10000);

    let mut group = c.benchmark_group("avl_remove");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("remove_10000_u64", |b| {
        b.iter_with_setup(
            || values.iter().copied().collect::<AvlTree<u64>>(),
            |mut tree| {
                for value in &values {
                    black_box(tree.remove(value));
                }
            },
        )
    });
    group.finish();
}

fn bench_avl_drop(c: &mut Criterion) {
    let values = random_values(10000);

    let mut group = c.benchmark_group("avl_drop");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("drop_10000", |b| {
        b.iter_with_setup(
            || values.iter().copied().collect::<AvlTree<u64>>(),
            |tree| {
                black_box(tree);
            },
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_avl_insert,
    bench_bst_insert,
    bench_btreemap_insert,
    bench_avl_search,
    bench_btreemap_search,
    bench_avl_remove,
    bench_avl_drop
);
criterion_main!(benches);
