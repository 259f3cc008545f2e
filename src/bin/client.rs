use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use blindtree::client;
use blindtree::config::{RunConfig, SecurityLevel};
use blindtree::engine::MaskEngine;
use blindtree::store::Layout;

/// Encrypts the demo inputs and publishes every artifact the other roles
/// need: context, public key, eval-mult key and ciphertexts to `data/`,
/// the secret key to `private_data/`.
#[derive(Parser, Debug)]
#[command(name = "bt-client")]
struct Args {
    /// Multiplicative depth of the evaluation chain
    #[arg(long, default_value_t = 8)]
    depth: u32,

    /// Plaintext modulus
    #[arg(long, default_value_t = 65537)]
    modulus: u64,

    /// Security level in bits (128, 192 or 256)
    #[arg(long, default_value_t = 128)]
    security: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !matches!(args.security, 128 | 192 | 256) {
        warn!(
            requested = args.security,
            "security level must be 128, 192 or 256; using 128"
        );
    }
    let cfg = RunConfig {
        depth: args.depth,
        modulus: args.modulus,
        security: SecurityLevel::from_bits(args.security),
    };

    let layout = Layout::open("data", "private_data")?;
    let input_a: Vec<i64> = vec![1, 1, 1, 1];
    let input_b: Vec<i64> = vec![1, 1, 1, 1];
    client::run(&MaskEngine::new(), cfg, &input_a, &input_b, &layout)?;
    Ok(())
}
