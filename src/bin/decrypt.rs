use anyhow::Result;
use tracing_subscriber::EnvFilter;

use blindtree::decrypt;
use blindtree::engine::MaskEngine;
use blindtree::store::Layout;

/// Recovers the plaintext result from `data/` using the secret key in
/// `private_data/`, and persists it as `result.txt`.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let layout = Layout::open("data", "private_data")?;
    let values = decrypt::run(&MaskEngine::new(), &layout)?;
    println!("output value: {values:?}");
    Ok(())
}
