//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (creation_sequence * MIXING_CONSTANT)
//!
//! where `creation_sequence` counts agents created since the engine started,
//! starting at 1.  Sequence 0 is the master stream itself (start-node picks),
//! which no agent shares.
//! Agent ids are client-chosen strings, so the sequence number (not the id)
//! feeds the seed; the same seed plus the same command stream reproduces the
//! same walk.
//!
//! - Agents never share RNG state, so the advance sweep can run on any number
//!   of threads without changing results.
//! - All RNG calls are local to the owning agent; no synchronisation needed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Owned by the agent itself; used when planning the next way and
/// destination.
#[derive(Debug, Clone)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and the agent's
    /// creation sequence number.
    pub fn new(global_seed: u64, sequence: u64) -> Self {
        let seed = global_seed ^ sequence.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (start-node selection).
///
/// Used only by the engine's single control loop.
#[derive(Debug)]
pub struct SimRng {
    seed:     u64,
    issued:   u64,
    inner:    SmallRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng { seed, issued: 1, inner: SmallRng::seed_from_u64(seed) }
    }

    /// Issue the RNG for the next agent created in this run.
    pub fn next_agent_rng(&mut self) -> AgentRng {
        let rng = AgentRng::new(self.seed, self.issued);
        self.issued += 1;
        rng
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.inner
    }
}
