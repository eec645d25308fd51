//! Storage abstraction layer for Strata.
//!
//! An index lives in a flat namespace of named files provided by a [`Storage`]
//! backend. File and memory backends can be swapped without touching the
//! index code.
//!
//! # Example
//!
//! ```
//! use strata::storage::{StorageConfig, StorageFactory};
//! use strata::storage::memory::MemoryStorageConfig;
//!
//! # fn main() -> strata::error::Result<()> {
//! let storage = StorageFactory::create(StorageConfig::Memory(MemoryStorageConfig::default()))?;
//! assert!(storage.list_files()?.is_empty());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod file;
pub mod memory;
pub mod structured;
pub mod traits;

pub use traits::{Storage, StorageInput, StorageLock, StorageOutput};

/// Type-safe configuration for the supported storage backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// File-based storage configuration (includes path)
    File(file::FileStorageConfig),

    /// Memory-based storage configuration
    Memory(memory::MemoryStorageConfig),
}

/// Helper for constructing concrete storage instances.
pub struct StorageFactory;

impl StorageFactory {
    /// Create a new storage instance with the given configuration.
    ///
    /// File storage creates its directory when it does not exist yet.
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(mem_config) => Ok(Arc::new(memory::MemoryStorage::new(mem_config))),
            StorageConfig::File(file_config) => {
                let path = file_config.path.clone();
                Ok(Arc::new(file::FileStorage::new(&path, file_config)?))
            }
        }
    }
}
