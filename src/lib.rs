//! Split-trust evaluation of a chain of homomorphic multiplications.
//!
//! Parties: Client, Compute, Decryptor
//!
//! 1. Client
//!     Config -> Context
//!     Context -> KeyPair, RelinKey
//!     PublicKey, Inputs -> Ciphertexts
//!     Context, PublicKey, RelinKey, Ciphertexts, Config -> shared store
//!     SecretKey -> secret store
//!
//! 2. Compute
//!     shared store -> Config, Context, RelinKey, Ciphertexts
//!     depth x EvalMult -> output ciphertext -> shared store
//!
//! 3. Decryptor
//!     shared store -> Context, output ciphertext
//!     secret store -> SecretKey
//!     Decrypt -> plaintext result
//!
//! The stores are the only channel between the parties; ordering them is
//! the operator's job, and a party that runs too early sees `NotFound`.

pub mod client;
pub mod compute;
pub mod config;
pub mod decrypt;
pub mod engine;
pub mod params;
pub mod pipeline;
pub mod store;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported multiplicative depth {0}: the profile table covers 1..=48")]
    UnsupportedDepth(u32),

    #[error("artifact store failure: {0}")]
    Store(#[from] store::StoreError),

    #[error("artifact `{artifact}` could not be encoded or decoded")]
    Serialization {
        artifact: String,
        source: bincode::Error,
    },

    #[error("engine rejected the operation: {0}")]
    Engine(#[from] engine::EngineError),
}
