//! The homomorphic-engine seam.
//!
//! The pipeline never touches polynomials itself: it sequences the opaque
//! operations of an engine behind the `HeEngine` trait and moves the
//! serialized results between roles. Backends are injected where a role is
//! constructed; there is no process-wide engine singleton.
//!
//! `MaskEngine` is the built-in reference backend: ElGamal-style
//! multiplicative masking over the integers modulo a prime plaintext
//! modulus. `Dec(Enc(a) * Enc(b)) == a * b mod m`, and ciphertexts and
//! keys carry context and key-pair tags that every operation checks.
//! Recovering a slot takes the secret exponent.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::params::AccelProfile;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("ciphertext or key is bound to a different context")]
    ContextMismatch,
    #[error("key does not belong to the ciphertext's key pair")]
    KeyMismatch,
    #[error("plaintext modulus {0} is unusable: an odd prime is required")]
    InvalidModulus(u64),
    #[error("slot counts differ: {left} vs {right}")]
    SlotCountMismatch { left: usize, right: usize },
}

/// The operations every backend must provide, mirroring the serialization
/// boundary of the artifact exchange: each associated type travels between
/// roles as an opaque blob.
pub trait HeEngine {
    type Context: Serialize + DeserializeOwned;
    type PublicKey: Serialize + DeserializeOwned;
    type SecretKey: Serialize + DeserializeOwned;
    type RelinKey: Serialize + DeserializeOwned;
    type Ciphertext: Serialize + DeserializeOwned;

    fn gen_context(&self, cfg: &RunConfig) -> Result<Self::Context, EngineError>;
    fn key_gen(&self, ctx: &Self::Context) -> (Self::PublicKey, Self::SecretKey);
    fn eval_mult_key_gen(
        &self,
        ctx: &Self::Context,
        secret: &Self::SecretKey,
    ) -> Result<Self::RelinKey, EngineError>;
    fn encrypt(
        &self,
        ctx: &Self::Context,
        public: &Self::PublicKey,
        values: &[i64],
    ) -> Result<Self::Ciphertext, EngineError>;
    fn eval_mult(
        &self,
        ctx: &Self::Context,
        relin: &Self::RelinKey,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, EngineError>;
    fn decrypt(
        &self,
        ctx: &Self::Context,
        secret: &Self::SecretKey,
        ct: &Self::Ciphertext,
    ) -> Result<Vec<i64>, EngineError>;
}

/// Reference backend over `(Z/mZ)*` for a prime `m`.
///
/// `Enc(x) = (g^r, x * h^r)` with `h = g^s`; multiplying two ciphertexts
/// multiplies both components slot-wise, and decryption strips the
/// accumulated mask with a Fermat inverse of `header^s`.
#[derive(Debug, Default, Clone)]
pub struct MaskEngine {
    profile: Option<AccelProfile>,
}

impl MaskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tuning hints only: results are identical with or without a profile.
    pub fn with_profile(profile: AccelProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn profile(&self) -> Option<&AccelProfile> {
        self.profile.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskContext {
    id: u64,
    modulus: u64,
    depth: u32,
    security_bits: u32,
    generator: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskPublicKey {
    context: u64,
    pair: u64,
    mask_base: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskSecretKey {
    context: u64,
    pair: u64,
    exponent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskRelinKey {
    context: u64,
    pair: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskCiphertext {
    context: u64,
    pair: u64,
    header: u64,
    slots: Vec<u64>,
}

impl HeEngine for MaskEngine {
    type Context = MaskContext;
    type PublicKey = MaskPublicKey;
    type SecretKey = MaskSecretKey;
    type RelinKey = MaskRelinKey;
    type Ciphertext = MaskCiphertext;

    fn gen_context(&self, cfg: &RunConfig) -> Result<MaskContext, EngineError> {
        let m = cfg.modulus;
        if m < 3 || !is_prime(m) {
            return Err(EngineError::InvalidModulus(m));
        }
        let mut rng = rand::thread_rng();
        Ok(MaskContext {
            id: rng.gen(),
            modulus: m,
            depth: cfg.depth,
            security_bits: cfg.security.bits(),
            generator: rng.gen_range(2..m),
        })
    }

    fn key_gen(&self, ctx: &MaskContext) -> (MaskPublicKey, MaskSecretKey) {
        let mut rng = rand::thread_rng();
        let pair = rng.gen();
        let exponent = rng.gen_range(1..ctx.modulus - 1);
        let public = MaskPublicKey {
            context: ctx.id,
            pair,
            mask_base: mod_pow(ctx.generator, exponent, ctx.modulus),
        };
        let secret = MaskSecretKey {
            context: ctx.id,
            pair,
            exponent,
        };
        (public, secret)
    }

    fn eval_mult_key_gen(
        &self,
        ctx: &MaskContext,
        secret: &MaskSecretKey,
    ) -> Result<MaskRelinKey, EngineError> {
        if secret.context != ctx.id {
            return Err(EngineError::ContextMismatch);
        }
        Ok(MaskRelinKey {
            context: ctx.id,
            pair: secret.pair,
        })
    }

    fn encrypt(
        &self,
        ctx: &MaskContext,
        public: &MaskPublicKey,
        values: &[i64],
    ) -> Result<MaskCiphertext, EngineError> {
        if public.context != ctx.id {
            return Err(EngineError::ContextMismatch);
        }
        let m = ctx.modulus;
        let r = rand::thread_rng().gen_range(1..m - 1);
        let mask = mod_pow(public.mask_base, r, m);
        let slots = values
            .iter()
            .map(|&v| {
                let v = v.rem_euclid(m as i64) as u64;
                mul_mod(v, mask, m)
            })
            .collect();
        Ok(MaskCiphertext {
            context: ctx.id,
            pair: public.pair,
            header: mod_pow(ctx.generator, r, m),
            slots,
        })
    }

    fn eval_mult(
        &self,
        ctx: &MaskContext,
        relin: &MaskRelinKey,
        a: &MaskCiphertext,
        b: &MaskCiphertext,
    ) -> Result<MaskCiphertext, EngineError> {
        if a.context != ctx.id || b.context != ctx.id || relin.context != ctx.id {
            return Err(EngineError::ContextMismatch);
        }
        if a.pair != relin.pair || b.pair != relin.pair {
            return Err(EngineError::KeyMismatch);
        }
        if a.slots.len() != b.slots.len() {
            return Err(EngineError::SlotCountMismatch {
                left: a.slots.len(),
                right: b.slots.len(),
            });
        }
        let m = ctx.modulus;
        let slots = a
            .slots
            .iter()
            .zip(&b.slots)
            .map(|(&x, &y)| mul_mod(x, y, m))
            .collect();
        Ok(MaskCiphertext {
            context: ctx.id,
            pair: a.pair,
            header: mul_mod(a.header, b.header, m),
            slots,
        })
    }

    fn decrypt(
        &self,
        ctx: &MaskContext,
        secret: &MaskSecretKey,
        ct: &MaskCiphertext,
    ) -> Result<Vec<i64>, EngineError> {
        if ct.context != ctx.id || secret.context != ctx.id {
            return Err(EngineError::ContextMismatch);
        }
        if ct.pair != secret.pair {
            return Err(EngineError::KeyMismatch);
        }
        let m = ctx.modulus;
        let mask = mod_pow(ct.header, secret.exponent, m);
        // Fermat: mask^(m-2) is the inverse for prime m.
        let unmask = mod_pow(mask, m - 2, m);
        Ok(ct
            .slots
            .iter()
            .map(|&slot| mul_mod(slot, unmask, m) as i64)
            .collect())
    }
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while (d as u128) * (d as u128) <= n as u128 {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
