use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rbtree::red_black;
use std::collections::BTreeSet;

#[derive(Clone)]
enum SetEnum<T> {
    RedBlack(red_black::Tree<T>),
    BTree(BTreeSet<T>),
}

impl<T> SetEnum<T>
where
    T: Ord + Clone,
{
    fn contains(&self, x: &T) -> bool {
        match self {
            Self::RedBlack(t) => t.contains(x),
            Self::BTree(s) => s.contains(x),
        }
    }

    fn insert(&mut self, x: T) -> bool {
        match self {
            Self::RedBlack(t) => t.insert(x),
            Self::BTree(s) => s.insert(x),
        }
    }

    fn remove(&mut self, x: &T) -> bool {
        match self {
            Self::RedBlack(t) => t.remove(x),
            Self::BTree(s) => s.remove(x),
        }
    }
}

/// Helper to bench a function on an ordered set.
/// It creates a group for the given name and closure and runs tests for various sizes and
/// implementations of sets before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut SetEnum<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_set = num_nodes as i32 - 1;

        // Ascending inserts are the worst case for an unbalanced BST.
        let red_black_tree: red_black::Tree<_> = (0..num_nodes as i32).collect();
        let btree_set: BTreeSet<_> = (0..num_nodes as i32).collect();
        let set_tests = [
            ("red_black", SetEnum::RedBlack(red_black_tree)),
            ("btree_set", SetEnum::BTree(btree_set)),
        ];
        for (name, set) in set_tests {
            let id = BenchmarkId::new(name, largest_element_in_set);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut set = black_box(set.clone());
                        let instant = std::time::Instant::now();
                        f(&mut set, black_box(largest_element_in_set));
                        let elapsed = instant.elapsed();
                        time += elapsed;
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "contains", |set, i| {
        black_box(set.contains(&i));
    });
    bench_helper(c, "remove", |set, i| {
        set.remove(&i);
    });

    bench_helper(c, "insert", |set, i| {
        set.insert(i + 1);
    });

    bench_helper(c, "contains-miss", |set, i| {
        black_box(set.contains(&(i + 1)));
    });
    bench_helper(c, "remove-miss", |set, i| {
        set.remove(&(i + 1));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
