use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use plytree::{AvlTree, Cursor, UnbalancedTree};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("avl_insert", |b| {
        let mut tree = AvlTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value, *value);
            }
        })
    });

    c.bench_function("unbalanced_insert", |b| {
        let mut tree = UnbalancedTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value, *value);
            }
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value, *value);
    }

    c.bench_function("avl_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.get(value));
            }
        })
    });

    c.bench_function("avl_iter", |b| {
        b.iter(|| {
            for (k, v) in &tree {
                black_box((k, v));
            }
        })
    });

    c.bench_function("avl_cursor", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new();
            cursor.attach(&mut tree);
            while let Some(value) = cursor.next(&tree) {
                black_box(value);
            }
            cursor.detach(&mut tree);
        })
    });

    c.bench_function("avl_remove", |b| {
        let mut tree = tree.clone();
        b.iter(|| {
            for value in &values {
                tree.remove(value);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
