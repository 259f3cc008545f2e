//! Depth-bucketed tuning profiles for an accelerated engine backend.
//!
//! The profile values are launch dimensions plus ring and decomposition
//! sizes; they are opaque hints consumed by the backend and never affect
//! what the pipeline computes, only how fast.

use crate::{Error, Result};

/// Highest multiplicative depth the profile table covers.
pub const MAX_DEPTH: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelProfile {
    pub grid_dim: u32,
    pub block_dim: u32,
    pub size_p: u32,
    pub ring_dim: u32,
    pub level_budget: u32,
    pub size_q: u32,
    pub phat_modq: u32,
}

const fn profile(
    grid_dim: u32,
    block_dim: u32,
    size_p: u32,
    ring_dim: u32,
    level_budget: u32,
    size_q: u32,
    phat_modq: u32,
) -> AccelProfile {
    AccelProfile {
        grid_dim,
        block_dim,
        size_p,
        ring_dim,
        level_budget,
        size_q,
        phat_modq,
    }
}

/// Maps a depth to its bucket's profile. Pure and deterministic: every depth
/// in `1..=MAX_DEPTH` lands in exactly one inclusive bucket; anything else
/// is `UnsupportedDepth` and the caller must abort before any crypto work.
pub fn select(depth: u32) -> Result<AccelProfile> {
    let profile = match depth {
        1 => profile(16, 512, 2, 8192, 2, 2, 3),
        2..=5 => profile(32, 512, 6, 16384, 2, 6, 7),
        6..=12 => profile(64, 512, 25, 32768, 4, 13, 14),
        13..=24 => profile(128, 512, 25, 65536, 7, 25, 26),
        25..=48 => profile(128, 512, 50, 65536, 12, 49, 50),
        _ => return Err(Error::UnsupportedDepth(depth)),
    };
    tracing::debug!(depth, ring_dim = profile.ring_dim, "acceleration profile selected");
    Ok(profile)
}
