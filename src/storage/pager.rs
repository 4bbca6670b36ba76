//! Serialized positional reads from the backing file.

use std::{
    io::{Read, Seek, SeekFrom},
    sync::Mutex,
};

use crate::types::{
    PageId,
    error::{DatabaseError, Result},
};

/// Anything the database can be read from: a `File`, or an in-memory
/// `Cursor<Vec<u8>>` in tests.
pub trait PageSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> PageSource for T {}

/// Single point of I/O. The source shares one file position, so every
/// seek+read pair runs under the same lock.
pub struct Pager {
    source: Mutex<Box<dyn PageSource>>,
    page_size: u32,
}

impl Pager {
    pub fn new(source: Box<dyn PageSource>, page_size: u32) -> Self {
        Self {
            source: Mutex::new(source),
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_offset(&self, page_id: PageId) -> u64 {
        u64::from(page_id) * u64::from(self.page_size)
    }

    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        let mut source = self
            .source
            .lock()
            .map_err(|_| DatabaseError::ConcurrencyError)?;
        source.seek(SeekFrom::Start(offset))?;
        source.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    pub fn read_page(&self, page_id: PageId) -> Result<Vec<u8>> {
        self.read_at(self.page_offset(page_id), self.page_size as usize)
    }
}
