pub mod codec;
pub mod cursor;
pub mod error;
pub mod field;
pub mod row;
pub mod value;

// Common type aliases
pub type PageId = u32;
pub type RowIndex = u64;
pub type ChunkNumber = u32;

// On-disk format constants
pub const FILE_MAGIC: &[u8; 8] = b"1CDBMSV8";
pub const SUPPORTED_VERSION: [u8; 4] = [8, 3, 8, 0];
pub const FILE_HEADER_SIZE: usize = 24;
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

pub const ROOT_OBJECT_PAGE: PageId = 2;
pub const OBJECT_SIGNATURE: [u8; 2] = [0x1C, 0xFD];
pub const OBJECT_LENGTH_OFFSET: usize = 16;
pub const OBJECT_PAGES_OFFSET: usize = 24;

pub const BLOB_CHUNK_SIZE: usize = 256;
pub const BLOB_CHUNK_HEADER_SIZE: usize = 6; // next chunk (4 bytes) + payload size (2 bytes)
pub const BLOB_CHUNK_PAYLOAD: usize = BLOB_CHUNK_SIZE - BLOB_CHUNK_HEADER_SIZE;

pub const DIRECTORY_LOCALE_SIZE: usize = 32;
pub const DIRECTORY_FIRST_CHUNK: ChunkNumber = 1;

pub const MIN_ROW_LENGTH: usize = 5; // liveness flag + free-list pointer
pub const MAX_ROW_LENGTH: usize = 1 << 20;
pub const ROW_VERSION_SIZE: usize = 16;
