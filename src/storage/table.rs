use std::sync::OnceLock;

use serde::Serialize;

use crate::{
    storage::{
        allocation::{BlockList, resolve_block_list},
        pager::Pager,
    },
    types::{
        ChunkNumber, MAX_ROW_LENGTH, MIN_ROW_LENGTH, PageId,
        error::{DatabaseError, Result},
        field::{Field, layout_fields},
    },
};

/// Header pages of a table's objects; 0 means the object does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableFiles {
    pub data: PageId,
    pub blob: PageId,
    pub index: PageId,
}

/// Schema of one table plus its lazily resolved block lists.
///
/// The block lists are resolve-once cells: the first reader resolves and
/// stores them, later readers reuse the stored list. Two readers racing on
/// an unresolved table both resolve, and one result is kept.
#[derive(Debug, Serialize)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
    pub record_lock: bool,
    pub files: TableFiles,
    pub row_length: usize,
    pub descriptor: ChunkNumber,
    pub placeholder: bool,
    #[serde(skip)]
    data_blocks: OnceLock<Option<BlockList>>,
    #[serde(skip)]
    blob_blocks: OnceLock<Option<BlockList>>,
}

impl Table {
    pub fn new(
        name: String,
        mut fields: Vec<Field>,
        record_lock: bool,
        files: TableFiles,
        descriptor: ChunkNumber,
    ) -> Result<Self> {
        let Some(row_length) = layout_fields(&mut fields) else {
            return Err(DatabaseError::MalformedSchema {
                table: name,
                reason: format!("row layout exceeds {MAX_ROW_LENGTH} bytes"),
            });
        };
        Ok(Self {
            name,
            fields,
            record_lock,
            files,
            row_length,
            descriptor,
            placeholder: false,
            data_blocks: OnceLock::new(),
            blob_blocks: OnceLock::new(),
        })
    }

    /// Stand-in for a table whose description could not be read.
    pub fn placeholder(descriptor: ChunkNumber) -> Self {
        Self {
            name: format!("MALFORMED_{descriptor}"),
            fields: Vec::new(),
            record_lock: false,
            files: TableFiles::default(),
            row_length: MIN_ROW_LENGTH,
            descriptor,
            placeholder: true,
            data_blocks: OnceLock::new(),
            blob_blocks: OnceLock::new(),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Data block list, resolved on first use. `None` when the table has no
    /// data object.
    pub fn data_blocks(&self, pager: &Pager, verify_signature: bool) -> Result<Option<&BlockList>> {
        resolve_once(&self.data_blocks, self.files.data, pager, verify_signature)
    }

    /// Blob block list, resolved on first use. `None` when the table has no
    /// blob object.
    pub fn blob_blocks(&self, pager: &Pager, verify_signature: bool) -> Result<Option<&BlockList>> {
        resolve_once(&self.blob_blocks, self.files.blob, pager, verify_signature)
    }

    /// Rows allocated in the data object, if its block list is resolved.
    pub fn row_count_hint(&self) -> Option<u64> {
        let blocks = self.data_blocks.get()?.as_ref()?;
        Some(blocks.byte_length() / self.row_length.max(MIN_ROW_LENGTH) as u64)
    }
}

fn resolve_once<'a>(
    cell: &'a OnceLock<Option<BlockList>>,
    page: PageId,
    pager: &Pager,
    verify_signature: bool,
) -> Result<Option<&'a BlockList>> {
    if let Some(blocks) = cell.get() {
        return Ok(blocks.as_ref());
    }
    let resolved = match page {
        0 => None,
        page => Some(resolve_block_list(pager, page, verify_signature)?),
    };
    Ok(cell.get_or_init(|| resolved).as_ref())
}
