//! Read-only access to `1CDBMSV8` page files.
//!
//! [`StorageManager`](storage::storage_manager::StorageManager) opens a file,
//! validates its header, discovers every table from the root directory and
//! decodes rows on demand.

pub mod executor;
pub mod storage;
pub mod types;
pub mod utils;

pub use storage::storage_manager::StorageManager;
pub use types::error::{DatabaseError, Result};
