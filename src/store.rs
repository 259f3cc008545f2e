//! Shared-medium artifact exchange between the pipeline roles.
//!
//! The directory store is the only channel between the client, compute and
//! decrypt roles; there is no direct call or network session between them.
//! `put` stages the bytes in a temporary file and renames it into place, so
//! a reader observes either nothing or the whole blob. `get` on a name that
//! has not been published yet fails immediately with `NotFound` instead of
//! waiting for a producer. Any medium with those two properties could stand
//! in for the directory implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

// Artifact names shared by every role.
pub const CRYPTO_CONTEXT: &str = "cryptocontext";
pub const KEY_PUBLIC: &str = "key-public";
pub const KEY_SECRET: &str = "key-private";
pub const KEY_EVAL_MULT: &str = "key-eval-mult";
pub const ENC_INPUT_A: &str = "enc_file1";
pub const ENC_INPUT_B: &str = "enc_file2";
pub const OUTPUT_CIPHERTEXT: &str = "output_ciphertext";
pub const CONFIG_FILE: &str = "config_params.txt";
pub const RESULT_TEXT: &str = "result.txt";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("artifact `{0}` has not been published")]
    NotFound(String),
    #[error("artifact store i/o failure")]
    Io(#[from] io::Error),
}

/// A named-blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens the store, creating the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> std::result::Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All-or-nothing publish: the blob becomes visible under `name` only
    /// once it is completely written.
    pub fn put(&self, name: &str, bytes: &[u8]) -> std::result::Result<(), StoreError> {
        let staged = self.root.join(format!("{name}.partial"));
        fs::write(&staged, bytes)?;
        fs::rename(&staged, self.root.join(name))?;
        Ok(())
    }

    /// Never blocks or polls: an unpublished name is `NotFound` right away.
    pub fn get(&self, name: &str) -> std::result::Result<Vec<u8>, StoreError> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// The two namespaces of one pipeline run. The secret namespace has exactly
/// two permitted readers, the client and the decryptor; the compute role is
/// never handed a reference to it.
#[derive(Debug, Clone)]
pub struct Layout {
    pub shared: DirStore,
    pub secret: DirStore,
}

impl Layout {
    pub fn open(
        shared: impl Into<PathBuf>,
        secret: impl Into<PathBuf>,
    ) -> std::result::Result<Self, StoreError> {
        Ok(Self {
            shared: DirStore::open(shared)?,
            secret: DirStore::open(secret)?,
        })
    }
}

/// Serializes `value` with bincode and publishes it under `name`.
pub fn put_blob<T: Serialize>(store: &DirStore, name: &str, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value).map_err(|source| Error::Serialization {
        artifact: name.to_string(),
        source,
    })?;
    store.put(name, &bytes)?;
    Ok(())
}

/// Fetches and decodes one artifact; a blob that does not decode as `T` is
/// a fatal serialization error, never a silently empty value.
pub fn get_blob<T: DeserializeOwned>(store: &DirStore, name: &str) -> Result<T> {
    let bytes = store.get(name)?;
    bincode::deserialize(&bytes).map_err(|source| Error::Serialization {
        artifact: name.to_string(),
        source,
    })
}
