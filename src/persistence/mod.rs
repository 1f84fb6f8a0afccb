//! Persisted key-value storage
//!
//! Features:
//! - One `KeyValueStore` port; scores and settings never touch a backend directly
//! - In-memory, JSON file (native) and LocalStorage (web) backends
//! - Atomic file writes (tmp → rename)
//!
//! Readers are expected to fail soft: a backend error means "use the default".

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;

use thiserror::Error;

/// Key holding the JSON scoreboard array
pub const SCOREBOARD_KEY: &str = "fps_scoreboard";
/// Key holding the stringified look sensitivity
pub const SENSITIVITY_KEY: &str = "fps_sensitivity";

/// Errors raised by storage backends
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored or outgoing data is not valid JSON for the expected shape
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The platform store could not be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
