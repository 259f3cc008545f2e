//! Compute role: blind evaluation of the multiplication chain.
//!
//! This role only ever receives the shared namespace. The secret namespace
//! is not a parameter here, so the role cannot name it, let alone read it.
//! Nothing in this module branches on plaintext content.

use tracing::{debug, info};

use crate::config::{self, RunConfig};
use crate::engine::HeEngine;
use crate::params;
use crate::store::{self, DirStore};
use crate::Result;

/// How many `eval_mult` calls the stage issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One multiplication, whatever the configured depth.
    SingleShot,
    /// Exactly `depth` chained multiplications of the running result with
    /// the second input ciphertext.
    #[default]
    DepthChain,
}

/// Evaluates the chain and publishes `output_ciphertext`. Any read or write
/// failure aborts the stage with no partial result published.
pub fn run<E: HeEngine>(engine: &E, shared: &DirStore, schedule: Schedule) -> Result<()> {
    let cfg = load_config(shared);
    // The depth gate comes first: nothing is deserialized for a depth the
    // profile table cannot serve.
    let profile = params::select(cfg.depth)?;
    debug!(ring_dim = profile.ring_dim, "compute stage tuned");

    let ctx: E::Context = store::get_blob(shared, store::CRYPTO_CONTEXT)?;
    let relin: E::RelinKey = store::get_blob(shared, store::KEY_EVAL_MULT)?;
    let ct_a: E::Ciphertext = store::get_blob(shared, store::ENC_INPUT_A)?;
    let ct_b: E::Ciphertext = store::get_blob(shared, store::ENC_INPUT_B)?;

    let rounds = match schedule {
        Schedule::SingleShot => 1,
        Schedule::DepthChain => cfg.depth,
    };
    let mut result = ct_a;
    for round in 0..rounds {
        result = engine.eval_mult(&ctx, &relin, &result, &ct_b)?;
        debug!(round, "eval-mult applied");
    }

    store::put_blob(shared, store::OUTPUT_CIPHERTEXT, &result)?;
    info!(rounds, "result ciphertext published");
    Ok(())
}

/// A missing config file silently means defaults, matching the writer side.
fn load_config(shared: &DirStore) -> RunConfig {
    config::read(&shared.root().join(store::CONFIG_FILE))
}
