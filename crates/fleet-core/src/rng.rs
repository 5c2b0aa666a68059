//! Deterministic per-agent RNG.
//!
//! Each transporter owns an independent `SmallRng` seeded by
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! so a run is reproducible for a fixed seed and agent set, and adding an
//! agent does not perturb the streams of the existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Point};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// A uniformly distributed unit vector on the floor plane.
    pub fn unit_direction(&mut self) -> Point {
        let angle: f32 = self.0.gen_range(0.0..std::f32::consts::TAU);
        Point::new(angle.cos(), angle.sin())
    }
}
