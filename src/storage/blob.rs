//! Blob streams: chains of 256-byte chunks addressed through an object's
//! block list.
//!
//! ```text
//! offset  size  field
//! 0       4     next chunk number (0 = last)
//! 4       2     payload size (0..=250)
//! 6       250   payload
//! ```

use std::io::ErrorKind;

use tracing::{debug, warn};

use crate::{
    storage::{allocation::BlockList, pager::Pager},
    types::{
        BLOB_CHUNK_PAYLOAD, BLOB_CHUNK_SIZE, ChunkNumber,
        cursor::ByteCursor,
        error::{DatabaseError, Result},
        value::BlobRef,
    },
};

/// File offset of `chunk` within the object described by `block_list`, or
/// `None` when the chunk lies past the object's pages.
pub fn chunk_offset(block_list: &BlockList, chunk: ChunkNumber, page_size: u32) -> Option<u64> {
    let logical = u64::from(chunk) * BLOB_CHUNK_SIZE as u64;
    let page_size = u64::from(page_size);
    let page_index = usize::try_from(logical / page_size).ok()?;
    let page = block_list.get(page_index)?;
    Some(u64::from(page) * page_size + logical % page_size)
}

/// Follows the chain starting at `first_chunk` and concatenates payloads.
///
/// A chunk outside the block list or past the end of the file, an oversized
/// payload or a cycle ends the stream early; the bytes gathered so far are
/// returned. Other I/O failures are errors.
pub fn read_blob_stream(pager: &Pager, block_list: &BlockList, first_chunk: ChunkNumber) -> Result<Vec<u8>> {
    let page_size = pager.page_size();
    let max_chunks = block_list.len() * (page_size as usize / BLOB_CHUNK_SIZE);
    let mut data = Vec::with_capacity(BLOB_CHUNK_PAYLOAD);
    let mut chunk = first_chunk;

    for _ in 0..max_chunks {
        if chunk == 0 {
            return Ok(data);
        }
        let Some(offset) = chunk_offset(block_list, chunk, page_size) else {
            debug!(chunk, pages = block_list.len(), "blob chunk outside of object");
            return Ok(data);
        };

        let bytes = match pager.read_at(offset, BLOB_CHUNK_SIZE) {
            Ok(bytes) => bytes,
            Err(DatabaseError::Io(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                warn!(chunk, offset, "blob chunk lies past the end of the file");
                return Ok(data);
            }
            Err(err) => return Err(err),
        };
        let mut cursor = ByteCursor::new(&bytes);
        let next = cursor.read_u32_le()?;
        let size = usize::from(cursor.read_u16_le()?);
        if size > BLOB_CHUNK_PAYLOAD {
            warn!(chunk, size, "blob chunk declares an oversized payload");
            return Ok(data);
        }
        data.extend_from_slice(cursor.read_bytes(size)?);
        chunk = next;
    }

    if chunk != 0 {
        warn!(first_chunk, "blob chain longer than its object, stopping");
    }
    Ok(data)
}

/// Reads the blob behind `reference`, truncated to its declared length.
pub fn read_blob_value(pager: &Pager, block_list: &BlockList, reference: &BlobRef) -> Result<Vec<u8>> {
    if reference.length == 0 {
        return Ok(Vec::new());
    }
    let mut data = read_blob_stream(pager, block_list, reference.chunk)?;
    if data.len() < reference.length as usize {
        debug!(
            chunk = reference.chunk,
            declared = reference.length,
            found = data.len(),
            "blob shorter than declared"
        );
    }
    data.truncate(reference.length as usize);
    Ok(data)
}
