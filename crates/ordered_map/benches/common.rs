use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{RuntimeProfile, mix_seed, seed_base, seed_for_iter, seeded_rng};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::Rng;
use rand::rngs::StdRng;

use ordered_map::{AvlTreeMap, BstMap, OrderedMap, RbTreeMap};

const SIZES: [usize; 4] = [1_000, 4_000, 16_000, 64_000];
// sequential keys make the plain BST a list; past this size it only measures that
const BST_SEQUENTIAL_MAX: usize = 4_000;
const OPS_PER_ITER: usize = 200;
const GET_HIT_RATE_PERCENT: u64 = 80;
const MIXED_INSERTS_PER_ITER: usize = OPS_PER_ITER / 10; // 10% inserts, 10% removes, 80% reads.
const SEQUENTIAL_STEP: usize = 4;

#[derive(Clone)]
enum ReadOp {
    Get { key: u64 },
    Floor { key: u64 },
    Ceiling { key: u64 },
}

#[derive(Clone)]
enum UpdateOp {
    Insert { key: u64, value: u64 },
    Remove { key: u64 },
}

#[derive(Clone)]
enum OrderOp {
    Rank { key: u64 },
    Select { rank: usize },
}

#[derive(Clone)]
enum MixedOp {
    Read(ReadOp),
    Update(UpdateOp),
}

fn populate<M: OrderedMap<Key = u64, Value = u64>>(keys: &[u64], seed: u64) -> M {
    let mut rng = seeded_rng(seed);
    let mut map = M::new();
    for &k in keys {
        let v: u64 = rng.random();
        black_box(map.insert(k, v));
    }
    map
}

/// Times `run` over freshly generated operations for every size in `SIZES`.
fn bench_workload<M, T, Op>(
    group: &mut BenchmarkGroup<'_, T>,
    label: &str,
    workload_id: u64,
    generate: impl Fn(&[u64], usize, u64, u64, &mut StdRng) -> Vec<Op>,
    run: impl Fn(&mut M, &[Op]),
) where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    for &size in &SIZES {
        RuntimeProfile::Small.apply(group);
        let base_seed = seed_base(workload_id, size as u64);
        let keys = generate_initial_keys(size, base_seed);
        let mut map = populate::<M>(&keys, base_seed ^ 0x11_22_33_44);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = seeded_rng(seed_for_iter(base_seed, iter));
                    let ops = generate(&keys, size, base_seed, iter, &mut rng);
                    let start = Instant::now();
                    run(&mut map, &ops);
                    black_box(map.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_read<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    bench_workload::<M, T, ReadOp>(
        group,
        label,
        1,
        |keys, _, _, _, rng| (0..OPS_PER_ITER).map(|_| read_op(keys, rng)).collect(),
        run_read_ops::<M>,
    );
}

pub fn bench_update<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    bench_workload::<M, T, UpdateOp>(
        group,
        label,
        2,
        |_, size, base_seed, iter, rng| generate_update_ops(size, base_seed, iter, rng),
        run_update_ops::<M>,
    );
}

pub fn bench_mixed<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    bench_workload::<M, T, MixedOp>(group, label, 3, generate_mixed_ops, run_mixed_ops::<M>);
}

pub fn bench_order<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    bench_workload::<M, T, OrderOp>(
        group,
        label,
        4,
        |keys, size, _, _, rng| {
            (0..OPS_PER_ITER)
                .map(|_| {
                    if rng.random::<u64>() & 1 == 0 {
                        OrderOp::Rank {
                            key: keys[rng.random_range(0..keys.len())],
                        }
                    } else {
                        OrderOp::Select {
                            rank: rng.random_range(0..size),
                        }
                    }
                })
                .collect()
        },
        run_order_ops::<M>,
    );
}

/// Whole-structure workload: insert `0..size`, look every key up, remove
/// every `SEQUENTIAL_STEP`-th key, then probe `ceiling` and `floor`.
pub fn bench_sequential<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str, max_size: usize)
where
    T: Measurement<Value = Duration>,
    M: OrderedMap<Key = u64, Value = u64>,
{
    for &size in SIZES.iter().filter(|&&size| size <= max_size) {
        RuntimeProfile::Medium.apply(group);
        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter(|| {
                let size = size as u64;
                let mut map = M::new();
                for i in 0..size {
                    black_box(map.insert(i, i));
                }
                for i in (0..=size).rev() {
                    black_box(map.get(&i));
                }
                for i in (0..size).step_by(SEQUENTIAL_STEP) {
                    black_box(map.remove(&i));
                }
                for i in (0..size).step_by(SEQUENTIAL_STEP) {
                    black_box(map.ceiling(&i));
                    black_box(map.floor(&i));
                }
                map.len()
            })
        });
    }
}

fn generate_initial_keys(size: usize, base_seed: u64) -> Vec<u64> {
    (0..size)
        .map(|i| mix_seed(base_seed ^ (i as u64)))
        .collect()
}

fn read_op(keys: &[u64], rng: &mut StdRng) -> ReadOp {
    match rng.random_range(0..3) {
        0 => {
            let hit = rng.random_range(0..100) < GET_HIT_RATE_PERCENT;
            let key = if hit {
                keys[rng.random_range(0..keys.len())]
            } else {
                rng.random()
            };
            ReadOp::Get { key }
        }
        1 => ReadOp::Floor { key: rng.random() },
        _ => ReadOp::Ceiling { key: rng.random() },
    }
}

fn generate_update_ops(size: usize, base_seed: u64, iter: u64, rng: &mut StdRng) -> Vec<UpdateOp> {
    let inserts = OPS_PER_ITER / 2;
    let mut inserted = Vec::with_capacity(inserts);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for i in 0..OPS_PER_ITER {
        if i % 2 == 0 {
            let id = (size as u64)
                .wrapping_add(iter.wrapping_mul(inserts as u64))
                .wrapping_add((i / 2) as u64);
            let key = mix_seed(base_seed ^ id);
            let value: u64 = rng.random();
            inserted.push(key);
            ops.push(UpdateOp::Insert { key, value });
        } else {
            let idx = rng.random_range(0..inserted.len());
            let key = inserted.swap_remove(idx);
            ops.push(UpdateOp::Remove { key });
        }
    }
    debug_assert!(inserted.is_empty());
    ops
}

fn generate_mixed_ops(
    keys: &[u64],
    size: usize,
    base_seed: u64,
    iter: u64,
    rng: &mut StdRng,
) -> Vec<MixedOp> {
    let mut remaining_inserts = MIXED_INSERTS_PER_ITER;
    let mut remaining_removes = MIXED_INSERTS_PER_ITER;
    let mut remaining_reads = OPS_PER_ITER - 2 * MIXED_INSERTS_PER_ITER;

    let mut live_inserted: Vec<u64> = Vec::with_capacity(MIXED_INSERTS_PER_ITER);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);

    while ops.len() < OPS_PER_ITER {
        let remaining_slots = OPS_PER_ITER - ops.len();
        debug_assert_eq!(
            remaining_slots,
            remaining_reads + remaining_inserts + remaining_removes
        );

        let updates_remaining = remaining_inserts + remaining_removes;
        let do_read = if remaining_reads == 0 {
            false
        } else if updates_remaining == 0 {
            true
        } else {
            rng.random_range(0..remaining_slots) < remaining_reads
        };

        if do_read {
            ops.push(MixedOp::Read(read_op(keys, rng)));
            remaining_reads -= 1;
            continue;
        }

        let can_insert = remaining_inserts > 0;
        let can_remove = remaining_removes > 0 && !live_inserted.is_empty();

        let do_remove = if !can_remove {
            false
        } else if !can_insert {
            true
        } else {
            rng.random_range(0..(remaining_inserts + remaining_removes)) < remaining_removes
        };

        if do_remove {
            let idx = rng.random_range(0..live_inserted.len());
            let key = live_inserted.swap_remove(idx);
            ops.push(MixedOp::Update(UpdateOp::Remove { key }));
            remaining_removes -= 1;
        } else {
            let insert_index = MIXED_INSERTS_PER_ITER - remaining_inserts;
            let id = (size as u64)
                .wrapping_add(iter.wrapping_mul(MIXED_INSERTS_PER_ITER as u64))
                .wrapping_add(insert_index as u64);
            let key = mix_seed(base_seed ^ id);
            let value: u64 = rng.random();
            live_inserted.push(key);
            ops.push(MixedOp::Update(UpdateOp::Insert { key, value }));
            remaining_inserts -= 1;
        }
    }

    debug_assert_eq!(remaining_reads, 0);
    debug_assert_eq!(remaining_inserts, 0);
    debug_assert_eq!(remaining_removes, 0);
    debug_assert!(live_inserted.is_empty());
    ops
}

fn run_read_op<M>(map: &mut M, op: &ReadOp)
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    match *op {
        ReadOp::Get { key } => {
            black_box(map.get(&key).copied());
        }
        ReadOp::Floor { key } => {
            black_box(map.floor(&key).copied());
        }
        ReadOp::Ceiling { key } => {
            black_box(map.ceiling(&key).copied());
        }
    }
}

fn run_update_op<M>(map: &mut M, op: &UpdateOp)
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    match *op {
        UpdateOp::Insert { key, value } => {
            black_box(map.insert(key, value));
        }
        UpdateOp::Remove { key } => {
            black_box(map.remove(&key));
        }
    }
}

fn run_read_ops<M>(map: &mut M, ops: &[ReadOp])
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    for op in ops {
        run_read_op(map, op);
    }
}

fn run_update_ops<M>(map: &mut M, ops: &[UpdateOp])
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    for op in ops {
        run_update_op(map, op);
    }
}

fn run_mixed_ops<M>(map: &mut M, ops: &[MixedOp])
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    for op in ops {
        match op {
            MixedOp::Read(op) => run_read_op(map, op),
            MixedOp::Update(op) => run_update_op(map, op),
        }
    }
}

fn run_order_ops<M>(map: &mut M, ops: &[OrderOp])
where
    M: OrderedMap<Key = u64, Value = u64>,
{
    for op in ops {
        match *op {
            OrderOp::Rank { key } => {
                black_box(map.rank(&key));
            }
            OrderOp::Select { rank } => {
                black_box(map.select(rank).copied());
            }
        }
    }
}

pub fn bench_all_read<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_read::<BstMap<u64, u64>, _>(group, "bst");
    bench_read::<AvlTreeMap<u64, u64>, _>(group, "avl");
    bench_read::<RbTreeMap<u64, u64>, _>(group, "rb");
}

pub fn bench_all_update<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_update::<BstMap<u64, u64>, _>(group, "bst");
    bench_update::<AvlTreeMap<u64, u64>, _>(group, "avl");
    bench_update::<RbTreeMap<u64, u64>, _>(group, "rb");
}

pub fn bench_all_mixed<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_mixed::<BstMap<u64, u64>, _>(group, "bst");
    bench_mixed::<AvlTreeMap<u64, u64>, _>(group, "avl");
    bench_mixed::<RbTreeMap<u64, u64>, _>(group, "rb");
}

pub fn bench_all_order<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_order::<BstMap<u64, u64>, _>(group, "bst");
    bench_order::<AvlTreeMap<u64, u64>, _>(group, "avl");
    bench_order::<RbTreeMap<u64, u64>, _>(group, "rb");
}

pub fn bench_all_sequential<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_sequential::<BstMap<u64, u64>, _>(group, "bst", BST_SEQUENTIAL_MAX);
    bench_sequential::<AvlTreeMap<u64, u64>, _>(group, "avl", usize::MAX);
    bench_sequential::<RbTreeMap<u64, u64>, _>(group, "rb", usize::MAX);
}
