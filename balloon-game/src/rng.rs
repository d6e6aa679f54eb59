//! Random sources for plan generation and capacity draws.
//!
//! Every stream is seeded from one user-visible seed so a session can be
//! replayed exactly. Plan and capacity draws use separate streams: pumping
//! behavior never changes which balloons a later reset produces.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

use crate::constants::{RNG_STREAM_CAPACITY, RNG_STREAM_PLAN};

/// Uniform integer generation plus an in-place shuffle.
pub trait RandomSource {
    /// Uniform integer in `[min, max]` inclusive. `min > max` is treated as `[max, min]`.
    fn uniform_int(&mut self, min: u32, max: u32) -> u32;

    /// Fisher–Yates shuffle built on [`RandomSource::uniform_int`].
    fn shuffle<T>(&mut self, items: &mut [T]) {
        let Ok(last) = u32::try_from(items.len()) else {
            return;
        };
        for i in (1..last).rev() {
            let j = self.uniform_int(0, i);
            items.swap(i as usize, j as usize);
        }
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R> CountingRng<R> {
    /// Wrap an existing generator.
    pub const fn wrap(rng: R) -> Self {
        Self { rng, draws: 0 }
    }
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self::wrap(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

impl<R: RngCore> RandomSource for CountingRng<R> {
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.gen_range(lo..=hi)
    }
}

/// Deterministic bundle of RNG streams segregated by game domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    plan: CountingRng<SmallRng>,
    capacity: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            plan: CountingRng::new(derive_stream_seed(seed, RNG_STREAM_PLAN)),
            capacity: CountingRng::new(derive_stream_seed(seed, RNG_STREAM_CAPACITY)),
        }
    }

    /// Seed this bundle was derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for color choice, tier binding and sequence order.
    pub const fn plan(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.plan
    }

    /// Stream used for per-round capacity draws.
    pub const fn capacity(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.capacity
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ fnv_tag(domain_tag);
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

fn fnv_tag(tag: &[u8]) -> u64 {
    tag.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}
