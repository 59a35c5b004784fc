use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::SeedableRng;
use rand::rngs::StdRng;

const SAMPLE_SIZE: usize = 15;
// criterion panics below ten samples.
const _: () = assert!(SAMPLE_SIZE >= 10);

/// Criterion sampling presets shared by the benchmark targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    /// Short runs for workloads that finish in microseconds.
    Small,
    /// Longer runs for whole-structure workloads.
    Medium,
}

impl RuntimeProfile {
    const fn warm_up(self) -> Duration {
        match self {
            Self::Small => Duration::from_millis(100),
            Self::Medium => Duration::from_millis(500),
        }
    }

    const fn measurement(self) -> Duration {
        match self {
            Self::Small => Duration::from_millis(200),
            Self::Medium => Duration::from_millis(1000),
        }
    }

    pub fn apply<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        group.sample_size(SAMPLE_SIZE);
        group.warm_up_time(self.warm_up());
        group.measurement_time(self.measurement());
    }
}

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer; spreads nearby seeds across the whole `u64` range.
pub fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one workload at one input size.
pub fn seed_base(workload_id: u64, size: u64) -> u64 {
    mix_seed(0x0DDB_A11A_2026_0000_u64 ^ (workload_id << 48) ^ size)
}

/// Seed for the `iter`-th criterion iteration of a workload.
pub fn seed_for_iter(base: u64, iter: u64) -> u64 {
    mix_seed(base ^ iter.wrapping_mul(SEED_MIX))
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
