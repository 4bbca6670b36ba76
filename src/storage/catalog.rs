//! Table discovery from the root object's directory blob.
//!
//! ```text
//! offset  size     field
//! 0       32       locale tag
//! 32      4        entry count n
//! 36      4 * n    description chunk numbers (0 = empty slot)
//! ```

use std::{collections::HashMap, sync::mpsc, thread};

use tracing::{debug, info, warn};

use crate::{
    storage::{
        allocation::BlockList,
        blob::read_blob_stream,
        pager::Pager,
        schema::{decode_description, parse_table_description},
        table::Table,
    },
    types::{
        ChunkNumber, DIRECTORY_LOCALE_SIZE, ROOT_OBJECT_PAGE,
        cursor::ByteCursor,
        error::{DatabaseError, Result},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectory {
    pub locale: String,
    pub entries: Vec<ChunkNumber>,
}

impl TableDirectory {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let corrupted = |err: DatabaseError| DatabaseError::CorruptedObject {
            page: ROOT_OBJECT_PAGE,
            reason: format!("table directory: {err}"),
        };
        let mut cursor = ByteCursor::new(bytes);
        let locale = cursor.read_bytes(DIRECTORY_LOCALE_SIZE).map_err(corrupted)?;
        let count = cursor.read_u32_le().map_err(corrupted)? as usize;
        if count > cursor.remaining() / 4 {
            return Err(DatabaseError::CorruptedObject {
                page: ROOT_OBJECT_PAGE,
                reason: format!("table directory declares {count} entries"),
            });
        }
        let entries = (0..count)
            .map(|_| cursor.read_u32_le())
            .collect::<Result<Vec<_>>>()?;

        let locale = String::from_utf8_lossy(locale)
            .trim_end_matches('\0')
            .trim()
            .to_string();
        Ok(Self { locale, entries })
    }

    /// Occupied slots with their positions.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, ChunkNumber)> + '_ {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, chunk)| *chunk != 0)
    }
}

/// Name-keyed index of every table, immutable once built.
#[derive(Debug, Default)]
pub struct TableCatalog {
    tables: HashMap<String, Table>,
    names: Vec<String>,
    locale: String,
}

impl TableCatalog {
    /// Reads every table description listed in `directory`, in parallel on
    /// at most `threads` workers. Descriptions that fail to read or parse
    /// become placeholder tables.
    pub fn build(
        pager: &Pager,
        root_blocks: &BlockList,
        directory: &TableDirectory,
        threads: usize,
    ) -> Self {
        let slots: Vec<(usize, ChunkNumber)> = directory.occupied().collect();
        let workers = threads.clamp(1, slots.len().max(1));
        let (sender, receiver) = mpsc::channel();

        let mut results = thread::scope(|scope| {
            for worker in 0..workers {
                let sender = sender.clone();
                let slots = &slots;
                scope.spawn(move || {
                    for &(slot, chunk) in slots.iter().skip(worker).step_by(workers) {
                        let table = read_table(pager, root_blocks, chunk);
                        if sender.send((slot, chunk, table)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(sender);
            receiver.iter().collect::<Vec<_>>()
        });
        results.sort_by_key(|(slot, _, _)| *slot);

        let mut catalog = Self {
            locale: directory.locale.clone(),
            ..Self::default()
        };
        for (slot, chunk, table) in results {
            let table = table.unwrap_or_else(|err| {
                warn!(slot, chunk, error = %err, "unreadable table description");
                Table::placeholder(chunk)
            });
            catalog.add_table(table);
        }
        catalog.names.sort();

        info!(
            tables = catalog.names.len(),
            slots = directory.entries.len(),
            locale = %catalog.locale,
            "table catalog loaded"
        );
        catalog
    }

    fn add_table(&mut self, table: Table) {
        if self.tables.contains_key(&table.name) {
            warn!(table = %table.name, descriptor = table.descriptor, "duplicate table name ignored");
            return;
        }
        debug!(table = %table.name, fields = table.fields.len(), row_length = table.row_length, "table discovered");
        self.names.push(table.name.clone());
        self.tables.insert(table.name.clone(), table);
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Table names in lexicographic order.
    pub fn table_names(&self) -> &[String] {
        &self.names
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.names.iter().filter_map(|name| self.tables.get(name))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn read_table(pager: &Pager, root_blocks: &BlockList, chunk: ChunkNumber) -> Result<Table> {
    let bytes = read_blob_stream(pager, root_blocks, chunk)?;
    parse_table_description(&decode_description(&bytes), chunk)
}
