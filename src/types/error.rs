use thiserror::Error;

use crate::types::PageId;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid database file: {reason}")]
    InvalidFormat { reason: String },

    #[error("Unsupported file format version {}.{}.{}.{}", version[0], version[1], version[2], version[3])]
    UnsupportedVersion { version: [u8; 4] },

    #[error("Unsupported allocation table level {level} at page {page}")]
    UnsupportedFatLevel { page: PageId, level: u8 },

    #[error("Malformed schema for table '{table}': {reason}")]
    MalformedSchema { table: String, reason: String },

    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("Field of type '{tag}' with length {length} does not fit in a row")]
    FieldTooLarge { tag: String, length: usize },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    #[error("Corrupted object: page={page}, reason={reason}")]
    CorruptedObject { page: PageId, reason: String },

    #[error("Concurrent access violation")]
    ConcurrencyError,
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
