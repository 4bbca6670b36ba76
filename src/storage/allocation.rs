//! Allocation tables: from an object's header page to the ordered list of
//! pages holding its bytes.
//!
//! ```text
//! offset  size  field
//! 0       2     signature 1C FD
//! 2       1     level (0 = direct, 1 = indirect)
//! 16      8     object length in bytes
//! 24      ...   page numbers (direct) or index page numbers (indirect)
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    storage::pager::Pager,
    types::{
        OBJECT_LENGTH_OFFSET, OBJECT_PAGES_OFFSET, OBJECT_SIGNATURE, PageId,
        cursor::ByteCursor,
        error::{DatabaseError, Result},
    },
};

/// How an object's page list is stored in its header page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatLayout {
    /// Data page numbers stored inline.
    Direct(Vec<PageId>),
    /// Numbers of index pages, each holding a zero-terminated run of data
    /// page numbers.
    Indirect(Vec<PageId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    pub signature: [u8; 2],
    pub length: u64,
    pub layout: FatLayout,
}

impl ObjectHeader {
    pub fn from_bytes(page_id: PageId, bytes: &[u8], page_size: u32) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let signature = cursor.read_array::<2>()?;
        let level = cursor.read_u8()?;

        cursor.seek(OBJECT_LENGTH_OFFSET)?;
        let length = cursor.read_u64_le()?;
        cursor.seek(OBJECT_PAGES_OFFSET)?;

        let layout = match level {
            0 => {
                let page_count = page_count_for(length, page_size);
                if page_count > cursor.remaining() / 4 {
                    return Err(DatabaseError::CorruptedObject {
                        page: page_id,
                        reason: format!(
                            "{} pages for {} bytes do not fit in a direct table",
                            page_count, length
                        ),
                    });
                }
                let pages = (0..page_count)
                    .map(|_| cursor.read_u32_le())
                    .collect::<Result<Vec<_>>>()?;
                FatLayout::Direct(pages)
            }
            1 => FatLayout::Indirect(cursor.read_u32_until_zero()),
            level => return Err(DatabaseError::UnsupportedFatLevel { page: page_id, level }),
        };

        Ok(Self {
            signature,
            length,
            layout,
        })
    }
}

/// The complete, ordered storage of one object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BlockList {
    pages: Vec<PageId>,
    length: u64,
}

impl BlockList {
    pub fn new(pages: Vec<PageId>, length: u64) -> Self {
        Self { pages, length }
    }

    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    pub fn get(&self, index: usize) -> Option<PageId> {
        self.pages.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Object length in bytes as declared by its header page.
    pub fn byte_length(&self) -> u64 {
        self.length
    }
}

pub fn page_count_for(length: u64, page_size: u32) -> usize {
    length.div_ceil(u64::from(page_size)) as usize
}

/// Reads the object header at `page_id` and flattens its allocation table.
pub fn resolve_block_list(pager: &Pager, page_id: PageId, verify_signature: bool) -> Result<BlockList> {
    let page_size = pager.page_size();
    let header_page = pager.read_page(page_id)?;
    let header = ObjectHeader::from_bytes(page_id, &header_page, page_size)?;

    if verify_signature && header.signature != OBJECT_SIGNATURE {
        warn!(
            page = page_id,
            signature = ?header.signature,
            "unexpected object signature"
        );
    }

    let expected = page_count_for(header.length, page_size);
    let pages = match header.layout {
        FatLayout::Direct(pages) => pages,
        FatLayout::Indirect(index_pages) => {
            let mut pages = Vec::with_capacity(expected);
            for index_page in index_pages {
                let bytes = pager.read_page(index_page)?;
                pages.extend(ByteCursor::new(&bytes).read_u32_until_zero());
                if pages.len() >= expected {
                    break;
                }
            }
            if pages.len() < expected {
                warn!(
                    page = page_id,
                    expected,
                    found = pages.len(),
                    "indirect allocation table is shorter than the object"
                );
            }
            pages.truncate(expected);
            pages
        }
    };

    debug!(page = page_id, length = header.length, pages = pages.len(), "resolved block list");
    Ok(BlockList::new(pages, header.length))
}
