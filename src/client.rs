//! Client role: owns the secret material, encrypts the inputs, publishes.
//!
//! The stages are strictly one-way. Each stage consumes the previous one,
//! so the chain can only move forward; a failure anywhere aborts the run
//! with no retry and no rollback of artifacts already published.

use tracing::{info, warn};

use crate::config::{self, RunConfig};
use crate::engine::HeEngine;
use crate::store::{self, Layout};
use crate::Result;

pub struct Client<'e, E: HeEngine> {
    engine: &'e E,
    cfg: RunConfig,
}

impl<'e, E: HeEngine> Client<'e, E> {
    pub fn new(engine: &'e E, cfg: RunConfig) -> Self {
        Self { engine, cfg }
    }

    pub fn build_context(self) -> Result<ContextReady<'e, E>> {
        let ctx = self.engine.gen_context(&self.cfg)?;
        info!("encryption context ready");
        Ok(ContextReady {
            engine: self.engine,
            cfg: self.cfg,
            ctx,
        })
    }
}

pub struct ContextReady<'e, E: HeEngine> {
    engine: &'e E,
    cfg: RunConfig,
    ctx: E::Context,
}

impl<'e, E: HeEngine> ContextReady<'e, E> {
    pub fn generate_keys(self) -> Result<KeysReady<'e, E>> {
        let (public, secret) = self.engine.key_gen(&self.ctx);
        let relin = self.engine.eval_mult_key_gen(&self.ctx, &secret)?;
        info!("key pair and eval-mult key generated");
        Ok(KeysReady {
            engine: self.engine,
            cfg: self.cfg,
            ctx: self.ctx,
            public,
            secret,
            relin,
        })
    }
}

pub struct KeysReady<'e, E: HeEngine> {
    engine: &'e E,
    cfg: RunConfig,
    ctx: E::Context,
    public: E::PublicKey,
    secret: E::SecretKey,
    relin: E::RelinKey,
}

impl<E: HeEngine> KeysReady<'_, E> {
    pub fn encrypt_inputs(self, a: &[i64], b: &[i64]) -> Result<Encrypted<E>> {
        let ct_a = self.engine.encrypt(&self.ctx, &self.public, a)?;
        let ct_b = self.engine.encrypt(&self.ctx, &self.public, b)?;
        info!(slots = a.len(), "inputs encrypted");
        Ok(Encrypted {
            cfg: self.cfg,
            ctx: self.ctx,
            public: self.public,
            secret: self.secret,
            relin: self.relin,
            ct_a,
            ct_b,
        })
    }
}

pub struct Encrypted<E: HeEngine> {
    cfg: RunConfig,
    ctx: E::Context,
    public: E::PublicKey,
    secret: E::SecretKey,
    relin: E::RelinKey,
    ct_a: E::Ciphertext,
    ct_b: E::Ciphertext,
}

impl<E: HeEngine> Encrypted<E> {
    /// Publishes the non-secret artifacts and the configuration to the
    /// shared namespace, and the secret key to the secret namespace. A
    /// publish failure is fatal; anything already published stays in place.
    pub fn publish(self, layout: &Layout) -> Result<()> {
        store::put_blob(&layout.shared, store::CRYPTO_CONTEXT, &self.ctx)?;
        store::put_blob(&layout.shared, store::KEY_PUBLIC, &self.public)?;
        store::put_blob(&layout.shared, store::KEY_EVAL_MULT, &self.relin)?;
        store::put_blob(&layout.shared, store::ENC_INPUT_A, &self.ct_a)?;
        store::put_blob(&layout.shared, store::ENC_INPUT_B, &self.ct_b)?;
        store::put_blob(&layout.secret, store::KEY_SECRET, &self.secret)?;

        let config_path = layout.shared.root().join(store::CONFIG_FILE);
        if let Err(err) = config::write(&config_path, &self.cfg) {
            warn!(%err, "could not persist the run configuration");
        }
        info!("client artifacts published");
        Ok(())
    }
}

/// The whole client stage in one call.
pub fn run<E: HeEngine>(
    engine: &E,
    cfg: RunConfig,
    a: &[i64],
    b: &[i64],
    layout: &Layout,
) -> Result<()> {
    Client::new(engine, cfg)
        .build_context()?
        .generate_keys()?
        .encrypt_inputs(a, b)?
        .publish(layout)
}
