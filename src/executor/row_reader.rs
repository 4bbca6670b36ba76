//! Locating and decoding one fixed-length row.

use tracing::{debug, warn};

use crate::{
    storage::{allocation::BlockList, blob::read_blob_value, pager::Pager, table::Table},
    types::{
        RowIndex,
        codec::decode_field,
        cursor::slice_at,
        error::Result,
        row::{Row, RowResult, RowState},
        value::Value,
    },
};

pub struct RowReader<'a> {
    pager: &'a Pager,
    table: &'a Table,
    verify_signature: bool,
}

impl<'a> RowReader<'a> {
    pub fn new(pager: &'a Pager, table: &'a Table, verify_signature: bool) -> Self {
        Self {
            pager,
            table,
            verify_signature,
        }
    }

    pub fn read_row(&self, index: RowIndex, resolve_blobs: bool) -> Result<RowResult> {
        let Some(data_blocks) = self.table.data_blocks(self.pager, self.verify_signature)? else {
            return Ok(RowResult::NotFound);
        };
        let Some(bytes) = self.read_raw(data_blocks, index)? else {
            return Ok(RowResult::NotFound);
        };

        let mut result = decode_row(self.table, index, &bytes);
        if resolve_blobs {
            if let RowResult::Alive(row) = &mut result {
                self.resolve_blobs(row)?;
            }
        }
        Ok(result)
    }

    /// The `row_length` bytes of row `index`, gathered across page
    /// boundaries. `None` when the row lies past the block list.
    pub fn read_raw(&self, data_blocks: &BlockList, index: RowIndex) -> Result<Option<Vec<u8>>> {
        let page_size = u64::from(self.pager.page_size());
        let row_length = self.table.row_length;
        let Some(mut address) = index.checked_mul(row_length as u64) else {
            return Ok(None);
        };
        let object_end = data_blocks.len() as u64 * page_size;
        if address.checked_add(row_length as u64).is_none_or(|end| end > object_end) {
            debug!(table = %self.table.name, index, "row past the end of the data object");
            return Ok(None);
        }

        let mut bytes = Vec::with_capacity(row_length);
        while bytes.len() < row_length {
            let Some(page) = usize::try_from(address / page_size)
                .ok()
                .and_then(|block| data_blocks.get(block))
            else {
                debug!(table = %self.table.name, index, "row past the end of the data object");
                return Ok(None);
            };
            let in_page = address % page_size;
            let take = ((page_size - in_page) as usize).min(row_length - bytes.len());
            let chunk = self.pager.read_at(u64::from(page) * page_size + in_page, take)?;
            bytes.extend_from_slice(&chunk);
            address += take as u64;
        }
        Ok(Some(bytes))
    }

    fn resolve_blobs(&self, row: &mut Row) -> Result<()> {
        let mut blob_blocks = None;
        for (_, value) in row.values.iter_mut() {
            let Value::BlobRef(reference) = value else {
                continue;
            };
            let reference = *reference;
            if blob_blocks.is_none() {
                let blocks = self
                    .table
                    .blob_blocks(self.pager, self.verify_signature)
                    .unwrap_or_else(|err| {
                        warn!(table = %self.table.name, error = %err, "blob object unreadable");
                        None
                    });
                blob_blocks = Some(blocks);
            }
            let content = match blob_blocks.flatten() {
                Some(blocks) => read_blob_value(self.pager, blocks, &reference)?,
                None => Vec::new(),
            };
            *value = Value::Blob(content);
        }
        Ok(())
    }
}

/// Classifies a raw row and decodes its fields when alive. Blob fields
/// decode to references.
pub fn decode_row(table: &Table, index: RowIndex, bytes: &[u8]) -> RowResult {
    match RowState::classify(bytes) {
        RowState::Nonexistent => RowResult::NotFound,
        RowState::Deleted => RowResult::Deleted,
        RowState::Alive => {
            let values = table
                .fields
                .iter()
                .map(|field| {
                    let value = match slice_at(bytes, field.offset, field.byte_len) {
                        Ok(raw) => decode_field(field, raw, table.files.blob),
                        Err(_) => Value::Null,
                    };
                    (field.name.clone(), value)
                })
                .collect();
            RowResult::Alive(Row::new(index, values))
        }
    }
}
