use crate::{
    executor::{row_reader::RowReader, scan::Scanner},
    storage::{storage_manager::StorageManager, table::Table},
    types::{
        RowIndex,
        error::DatabaseError,
        row::{Row, RowResult},
    },
};

/// Walks a table's rows in index order, skipping deleted rows and stopping
/// at the first row past the allocated data.
pub struct TableScanner<'a> {
    reader: RowReader<'a>,
    table: &'a Table,
    next_index: RowIndex,
    resolve_blobs: bool,
    is_exhausted: bool,
}

impl<'a> TableScanner<'a> {
    pub fn new(
        storage_manager: &'a StorageManager,
        table_name: &str,
        resolve_blobs: bool,
    ) -> Result<Self, DatabaseError> {
        let table = storage_manager.get_table_schema(table_name)?;
        let reader = RowReader::new(
            storage_manager.pager(),
            table,
            storage_manager.options().verify_object_signature,
        );
        Ok(Self {
            reader,
            table,
            next_index: 0,
            resolve_blobs,
            is_exhausted: false,
        })
    }

    /// Index of the next row to be read.
    pub fn position(&self) -> RowIndex {
        self.next_index
    }

    fn past_declared_length(&self) -> bool {
        self.table
            .row_count_hint()
            .is_some_and(|rows| self.next_index >= rows)
    }
}

impl Scanner for TableScanner<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        while !self.is_exhausted {
            if self.past_declared_length() {
                self.is_exhausted = true;
                break;
            }
            let index = self.next_index;
            self.next_index += 1;
            match self.reader.read_row(index, self.resolve_blobs)? {
                RowResult::Alive(row) => return Ok(Some(row)),
                RowResult::Deleted => continue,
                RowResult::NotFound => self.is_exhausted = true,
            }
        }
        Ok(None)
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::with_capacity(batch_size);
        while rows.len() < batch_size {
            match self.scan()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.next_index = 0;
        self.is_exhausted = false;
        Ok(())
    }
}
