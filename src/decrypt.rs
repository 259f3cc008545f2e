//! Decrypt role: the only consumer of the secret key besides the client.

use tracing::info;

use crate::engine::HeEngine;
use crate::store::{self, Layout};
use crate::Result;

/// Recovers the plaintext result and persists it as readable text under
/// `result.txt`. Failure at any load or decrypt step is fatal; there is no
/// partial-decrypt recovery.
pub fn run<E: HeEngine>(engine: &E, layout: &Layout) -> Result<Vec<i64>> {
    let ctx: E::Context = store::get_blob(&layout.shared, store::CRYPTO_CONTEXT)?;
    let secret: E::SecretKey = store::get_blob(&layout.secret, store::KEY_SECRET)?;
    let output: E::Ciphertext = store::get_blob(&layout.shared, store::OUTPUT_CIPHERTEXT)?;

    let values = engine.decrypt(&ctx, &secret, &output)?;

    let mut text = values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    text.push('\n');
    layout.shared.put(store::RESULT_TEXT, text.as_bytes())?;

    info!(slots = values.len(), "result decrypted and persisted");
    Ok(values)
}
