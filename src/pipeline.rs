//! One parameterized pipeline instead of per-variant binaries.
//!
//! `Mode` covers every combination of multiply schedule and decrypt
//! packaging from a single driver. The driver is also where stage ordering
//! lives: the store itself never waits, so whoever invokes the stages is
//! responsible for running them in order.

use crate::client;
use crate::compute::{self, Schedule};
use crate::config::RunConfig;
use crate::decrypt;
use crate::engine::HeEngine;
use crate::store::Layout;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptStage {
    /// Decryption happens in a later, separate invocation.
    #[default]
    Separate,
    /// The driver runs the decrypt stage immediately after compute.
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode {
    pub schedule: Schedule,
    pub decrypt: DecryptStage,
}

/// Runs client then compute against one layout, then the decrypt stage too
/// in combined mode. Returns the decrypted slots when it ran.
pub fn run<E: HeEngine>(
    engine: &E,
    cfg: RunConfig,
    a: &[i64],
    b: &[i64],
    layout: &Layout,
    mode: Mode,
) -> Result<Option<Vec<i64>>> {
    client::run(engine, cfg, a, b, layout)?;
    compute::run(engine, &layout.shared, mode.schedule)?;
    match mode.decrypt {
        DecryptStage::Separate => Ok(None),
        DecryptStage::Combined => decrypt::run(engine, layout).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::config::SecurityLevel;
    use crate::engine::MaskEngine;
    use crate::store::{self, StoreError};
    use crate::Error;

    fn scratch(tag: &str) -> Layout {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("blindtree-pipe-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        Layout::open(dir.join("data"), dir.join("private_data")).unwrap()
    }

    fn cfg(depth: u32) -> RunConfig {
        RunConfig {
            depth,
            modulus: 65537,
            security: SecurityLevel::Bits128,
        }
    }

    fn combined(schedule: Schedule) -> Mode {
        Mode {
            schedule,
            decrypt: DecryptStage::Combined,
        }
    }

    #[test]
    fn depth_three_ones_stay_ones() {
        let engine = MaskEngine::new();
        let layout = scratch("ones");
        let out = run(
            &engine,
            cfg(3),
            &[1, 1, 1, 1],
            &[1, 1, 1, 1],
            &layout,
            combined(Schedule::DepthChain),
        )
        .unwrap();
        assert_eq!(out, Some(vec![1, 1, 1, 1]));
    }

    #[test]
    fn chain_computes_a_times_b_to_the_depth() {
        let engine = MaskEngine::new();
        let layout = scratch("algebra");
        let depth = 5u32;
        let out = run(
            &engine,
            cfg(depth),
            &[2, 3, 4, 7],
            &[3, 3, 2, 5],
            &layout,
            combined(Schedule::DepthChain),
        )
        .unwrap()
        .unwrap();
        let expected: Vec<i64> = [(2, 3), (3, 3), (4, 2), (7, 5)]
            .iter()
            .map(|&(a, b): &(i64, i64)| {
                let mut acc = a;
                for _ in 0..depth {
                    acc = acc * b % 65537;
                }
                acc
            })
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn single_shot_multiplies_exactly_once() {
        let engine = MaskEngine::new();
        let layout = scratch("single");
        // Depth 7 in the config, but single-shot mode ignores it.
        let out = run(
            &engine,
            cfg(7),
            &[2, 2],
            &[3, 5],
            &layout,
            combined(Schedule::SingleShot),
        )
        .unwrap();
        assert_eq!(out, Some(vec![6, 10]));
    }

    #[test]
    fn separate_mode_defers_decryption() {
        let engine = MaskEngine::new();
        let layout = scratch("separate");
        let out = run(
            &engine,
            cfg(2),
            &[4],
            &[3],
            &layout,
            Mode::default(),
        )
        .unwrap();
        assert_eq!(out, None);
        // A later, separate decrypt invocation finds everything it needs.
        assert_eq!(decrypt::run(&engine, &layout).unwrap(), vec![36]);
        let text = layout.shared.get(store::RESULT_TEXT).unwrap();
        assert_eq!(text, b"36\n");
    }

    #[test]
    fn compute_never_needs_the_secret_namespace() {
        let engine = MaskEngine::new();
        let layout = scratch("blind");
        client::run(&engine, cfg(3), &[2, 3], &[3, 2], &layout).unwrap();
        // Remove the secret namespace entirely; the compute stage's inputs
        // all live in the shared one.
        fs::remove_dir_all(layout.secret.root()).unwrap();
        compute::run(&engine, &layout.shared, Schedule::DepthChain).unwrap();
        assert!(layout.shared.get(store::OUTPUT_CIPHERTEXT).is_ok());
    }

    #[test]
    fn unsupported_depth_aborts_before_any_output() {
        let engine = MaskEngine::new();
        let layout = scratch("deep");
        client::run(&engine, cfg(49), &[1], &[1], &layout).unwrap();
        let err = compute::run(&engine, &layout.shared, Schedule::DepthChain).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDepth(49)));
        assert!(matches!(
            layout.shared.get(store::OUTPUT_CIPHERTEXT),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn premature_consumption_is_not_found() {
        let engine = MaskEngine::new();
        let layout = scratch("early");
        // Nothing has been published: compute fails on the first artifact
        // it tries to load rather than blocking.
        client::run(&engine, cfg(2), &[1], &[1], &layout).unwrap();
        let bare = scratch("early-bare");
        let err = compute::run(&engine, &bare.shared, Schedule::DepthChain).unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::NotFound(ref name)) if name == store::CRYPTO_CONTEXT
        ));
        // Same for a decryptor that outruns the compute stage.
        let err = decrypt::run(&engine, &layout).unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::NotFound(ref name)) if name == store::OUTPUT_CIPHERTEXT
        ));
    }

    #[test]
    fn compute_falls_back_to_default_depth_without_config() {
        let engine = MaskEngine::new();
        let layout = scratch("defaults");
        client::run(&engine, cfg(8), &[1, 2], &[1, 3], &layout).unwrap();
        fs::remove_file(layout.shared.root().join(store::CONFIG_FILE)).unwrap();
        // Default depth is 8, the same value the client used, so the result
        // still decrypts to a * b^8.
        compute::run(&engine, &layout.shared, Schedule::DepthChain).unwrap();
        let out = decrypt::run(&engine, &layout).unwrap();
        assert_eq!(out, vec![1, (2 * 3i64.pow(8)) % 65537]);
    }

    #[test]
    fn corrupt_artifact_is_fatal() {
        let engine = MaskEngine::new();
        let layout = scratch("corrupt");
        client::run(&engine, cfg(2), &[1], &[1], &layout).unwrap();
        layout.shared.put(store::ENC_INPUT_B, b"\x00\x01").unwrap();
        let err = compute::run(&engine, &layout.shared, Schedule::DepthChain).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialization { ref artifact, .. } if artifact == store::ENC_INPUT_B
        ));
    }
}
