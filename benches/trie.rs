use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::Criterion;
use rand::seq::SliceRandom;
use rand::thread_rng;
use yfast::RbTree;
use yfast::XFastTrie;
use yfast::YFastTrie;

/// Distinct pseudo-random keys: a bijective odd multiplier spreads the
/// range, a shuffle kills the insertion-order structure.
fn keys(count: usize) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..count as u32)
        .map(|i| i.wrapping_mul(2_654_435_761))
        .collect();
    keys.shuffle(&mut thread_rng());
    keys
}

fn bench_insert(c: &mut Criterion) {
    let input = keys(10_000);

    let mut group = c.benchmark_group("insert_10k");
    group.bench_function("rbtree", |b| {
        b.iter_batched(
            RbTree::new,
            |mut tree| {
                for &key in &input {
                    tree.insert(key);
                }
                tree
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("xfast", |b| {
        b.iter_batched(
            XFastTrie::new,
            |mut trie| {
                for &key in &input {
                    trie.insert(key);
                }
                trie
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("yfast", |b| {
        b.iter_batched(
            YFastTrie::new,
            |mut trie| {
                for &key in &input {
                    trie.insert(key);
                }
                trie
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let input = keys(10_000);
    let probes = keys(1_000);

    let mut tree = RbTree::new();
    let mut xfast = XFastTrie::new();
    let mut yfast = YFastTrie::new();
    for &key in &input {
        tree.insert(key);
        xfast.insert(key);
        yfast.insert(key);
    }

    let mut group = c.benchmark_group("predecessor_10k");
    group.bench_function("rbtree", |b| {
        b.iter(|| {
            probes
                .iter()
                .filter(|&&probe| tree.predecessor(probe).is_some())
                .count()
        })
    });
    group.bench_function("xfast", |b| {
        b.iter(|| {
            probes
                .iter()
                .filter(|&&probe| xfast.predecessor(probe).is_some())
                .count()
        })
    });
    group.bench_function("yfast", |b| {
        b.iter(|| {
            probes
                .iter()
                .filter(|&&probe| yfast.predecessor(probe).is_some())
                .count()
        })
    });
    group.finish();

    let mut group = c.benchmark_group("contains_10k");
    group.bench_function("rbtree", |b| {
        b.iter(|| probes.iter().filter(|&&probe| tree.contains(probe)).count())
    });
    group.bench_function("xfast", |b| {
        b.iter(|| probes.iter().filter(|&&probe| xfast.contains(probe)).count())
    });
    group.bench_function("yfast", |b| {
        b.iter(|| probes.iter().filter(|&&probe| yfast.contains(probe)).count())
    });
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let input = keys(10_000);

    let mut group = c.benchmark_group("remove_10k");
    group.bench_function("yfast", |b| {
        b.iter_batched(
            || {
                let mut trie = YFastTrie::new();
                for &key in &input {
                    trie.insert(key);
                }
                trie
            },
            |mut trie| {
                for &key in &input {
                    trie.remove(key);
                }
                trie
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_queries, bench_remove);
criterion_main!(benches);
