//! Synthetic database files for tests and benches.
//!
//! [`MockDatabase`] lays out a complete file: header, the root object with
//! its table directory and descriptions, and per table a data object and a
//! blob object. Data pages are allocated in reverse order so that logical
//! and physical page numbers never line up.

use std::{
    io::{Cursor, Write},
    path::Path,
};

use tempfile::{Builder, NamedTempFile};

use crate::{
    storage::{header::DatabaseHeader, options::StorageOptions, storage_manager::StorageManager},
    types::{
        BLOB_CHUNK_PAYLOAD, BLOB_CHUNK_SIZE, ChunkNumber, DIRECTORY_FIRST_CHUNK,
        DIRECTORY_LOCALE_SIZE, FILE_HEADER_SIZE, OBJECT_LENGTH_OFFSET, OBJECT_PAGES_OFFSET,
        OBJECT_SIGNATURE, PageId, ROOT_OBJECT_PAGE,
        error::Result,
        field::{Field, FieldType, layout_fields},
    },
};

#[derive(Debug, Clone)]
pub struct MockField {
    pub name: String,
    pub tag: String,
    pub nullable: bool,
    pub length: usize,
    pub precision: usize,
    pub case_sensitive: bool,
}

impl MockField {
    pub fn new(name: &str, tag: &str, length: usize, precision: usize) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            nullable: false,
            length,
            precision,
            case_sensitive: true,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    fn description(&self) -> String {
        format!(
            r#"{{"{}","{}",{},{},{},"{}"}}"#,
            self.name,
            self.tag,
            u8::from(self.nullable),
            self.length,
            self.precision,
            if self.case_sensitive { "CS" } else { "CI" }
        )
    }
}

#[derive(Debug, Clone)]
pub struct MockTable {
    pub name: String,
    pub fields: Vec<MockField>,
    pub record_lock: bool,
    pub rows: Vec<Vec<u8>>,
    pub blobs: Vec<Vec<u8>>,
    pub indirect_data: bool,
    pub raw_description: Option<String>,
    next_chunk: ChunkNumber,
}

impl MockTable {
    pub fn new(name: &str, fields: Vec<MockField>) -> Self {
        Self {
            name: name.to_string(),
            fields,
            record_lock: false,
            rows: Vec::new(),
            blobs: Vec::new(),
            indirect_data: false,
            raw_description: None,
            next_chunk: 1,
        }
    }

    /// A table entry whose description text is written verbatim.
    pub fn with_raw_description(description: &str) -> Self {
        Self {
            raw_description: Some(description.to_string()),
            ..Self::new("", Vec::new())
        }
    }

    pub fn record_lock(mut self) -> Self {
        self.record_lock = true;
        self
    }

    /// Store the data object behind index pages.
    pub fn indirect(mut self) -> Self {
        self.indirect_data = true;
        self
    }

    /// Field layout as the reader computes it.
    pub fn layout(&self) -> (Vec<Field>, usize) {
        let mut fields: Vec<Field> = self
            .fields
            .iter()
            .map(|mock| {
                let field_type = FieldType::from_tag(&mock.tag).expect("mock field type");
                let field = Field::new(mock.name.clone(), field_type, mock.length, mock.precision);
                if mock.nullable { field.nullable() } else { field }
            })
            .collect();
        let row_length = layout_fields(&mut fields).expect("mock row fits the row limit");
        (fields, row_length)
    }

    pub fn row_length(&self) -> usize {
        self.layout().1
    }

    /// Appends an alive row. Nullable fields given a value get their
    /// presence flag set; fields left out stay zero.
    pub fn push_row(&mut self, values: &[(&str, Vec<u8>)]) -> &mut Self {
        let (fields, row_length) = self.layout();
        let mut row = vec![0u8; row_length];
        for (name, bytes) in values {
            let field = fields
                .iter()
                .find(|field| field.name == *name)
                .expect("mock row names a declared field");
            let mut offset = field.offset;
            if field.nullable {
                row[offset] = 1;
                offset += 1;
            }
            let end = (offset + bytes.len()).min(field.offset + field.byte_len);
            row[offset..end].copy_from_slice(&bytes[..end - offset]);
        }
        self.rows.push(row);
        self
    }

    /// Appends a deleted row: flag 1 followed by a free-list pointer.
    pub fn push_deleted(&mut self, next_free: u32) -> &mut Self {
        let mut row = vec![0u8; self.row_length()];
        row[0] = 1;
        row[1..5].copy_from_slice(&next_free.to_le_bytes());
        self.rows.push(row);
        self
    }

    pub fn push_raw(&mut self, row: Vec<u8>) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Stores `payload` in the blob object and returns its 8-byte field
    /// value (first chunk, length).
    pub fn add_blob(&mut self, payload: &[u8]) -> Vec<u8> {
        let chunk = self.next_chunk;
        self.next_chunk += chunks_for(payload.len()) as ChunkNumber;
        self.blobs.push(payload.to_vec());
        encode_blob_ref(chunk, payload.len() as u32)
    }

    fn description(&self, data: PageId, blob: PageId) -> String {
        if let Some(raw) = &self.raw_description {
            return raw.clone();
        }
        let fields = self
            .fields
            .iter()
            .map(MockField::description)
            .collect::<Vec<_>>()
            .join(",\n");
        let fields = if fields.is_empty() {
            "{\"Fields\"\n}".to_string()
        } else {
            format!("{{\"Fields\",\n{fields}\n}}")
        };
        format!(
            "{{\"{}\",0,\n{},\n{{\"Indexes\"}},\n{{\"Recordlock\",\"{}\"}},\n{{\"Files\",{},{},0}}\n}}",
            self.name,
            fields,
            u8::from(self.record_lock),
            data,
            blob
        )
    }
}

enum DirectoryEntry {
    Table(Box<MockTable>),
    Empty,
}

pub struct MockDatabase {
    pub page_size: u32,
    pub locale: String,
    pub utf16_descriptions: bool,
    pub indirect_root: bool,
    entries: Vec<DirectoryEntry>,
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDatabase {
    pub fn new() -> Self {
        Self {
            page_size: 4096,
            locale: "ru_RU".to_string(),
            utf16_descriptions: true,
            indirect_root: false,
            entries: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn utf8_descriptions(mut self) -> Self {
        self.utf16_descriptions = false;
        self
    }

    pub fn indirect_root(mut self) -> Self {
        self.indirect_root = true;
        self
    }

    pub fn add_table(&mut self, table: MockTable) -> &mut Self {
        self.entries.push(DirectoryEntry::Table(Box::new(table)));
        self
    }

    /// A zero slot in the table directory.
    pub fn add_empty_slot(&mut self) -> &mut Self {
        self.entries.push(DirectoryEntry::Empty);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut file = PageWriter::new(self.page_size);
        let free_pages = file.allocate();
        file.write_object_header(free_pages, 0, 0, &[]);
        let root = file.allocate();
        debug_assert_eq!(root, ROOT_OBJECT_PAGE);

        let mut descriptions = Vec::new();
        for entry in &self.entries {
            let DirectoryEntry::Table(table) = entry else {
                descriptions.push(None);
                continue;
            };
            let data = if table.rows.is_empty() {
                0
            } else {
                file.write_object(&table.rows.concat(), table.indirect_data)
            };
            let blob = if table.blobs.is_empty() {
                0
            } else {
                let blobs: Vec<&[u8]> = table.blobs.iter().map(Vec::as_slice).collect();
                file.write_object(&blob_area(&blobs), false)
            };
            let text = table.description(data, blob);
            descriptions.push(Some(if self.utf16_descriptions {
                encode_utf16(&text)
            } else {
                text.into_bytes()
            }));
        }

        let directory_len = DIRECTORY_LOCALE_SIZE + 4 + 4 * descriptions.len();
        let mut next_chunk = DIRECTORY_FIRST_CHUNK + chunks_for(directory_len) as ChunkNumber;
        let mut directory = vec![0u8; DIRECTORY_LOCALE_SIZE];
        let locale = self.locale.as_bytes();
        directory[..locale.len().min(DIRECTORY_LOCALE_SIZE)]
            .copy_from_slice(&locale[..locale.len().min(DIRECTORY_LOCALE_SIZE)]);
        directory.extend_from_slice(&(descriptions.len() as u32).to_le_bytes());
        for description in &descriptions {
            let chunk = match description {
                Some(bytes) => {
                    let chunk = next_chunk;
                    next_chunk += chunks_for(bytes.len()) as ChunkNumber;
                    chunk
                }
                None => 0,
            };
            directory.extend_from_slice(&chunk.to_le_bytes());
        }

        let mut blobs: Vec<&[u8]> = vec![directory.as_slice()];
        blobs.extend(descriptions.iter().flatten().map(Vec::as_slice));
        file.write_object_at(root, &blob_area(&blobs), self.indirect_root);
        file.finish()
    }

    pub fn open(&self) -> Result<StorageManager> {
        self.open_with_options(StorageOptions::default())
    }

    pub fn open_with_options(&self, options: StorageOptions) -> Result<StorageManager> {
        StorageManager::from_source(Box::new(Cursor::new(self.build())), options)
    }

    pub fn write_to_temp(&self) -> TempDatabase {
        TempDatabase::with_bytes(&self.build())
    }
}

/// A database file on disk, removed on drop.
pub struct TempDatabase {
    file: NamedTempFile,
}

impl TempDatabase {
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut file = Builder::new()
            .prefix("onecd_test_")
            .suffix(".1CD")
            .tempfile()
            .expect("create temp database");
        file.write_all(bytes).expect("write temp database");
        file.flush().expect("flush temp database");
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn open(&self) -> Result<StorageManager> {
        StorageManager::open(self.path())
    }
}

struct PageWriter {
    page_size: usize,
    pages: Vec<Vec<u8>>,
}

impl PageWriter {
    fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size as usize,
            pages: vec![vec![0u8; page_size as usize]],
        }
    }

    fn allocate(&mut self) -> PageId {
        self.pages.push(vec![0u8; self.page_size]);
        (self.pages.len() - 1) as PageId
    }

    fn write_object(&mut self, content: &[u8], indirect: bool) -> PageId {
        let header = self.allocate();
        self.write_object_at(header, content, indirect);
        header
    }

    fn write_object_at(&mut self, header: PageId, content: &[u8], indirect: bool) {
        let page_count = content.len().div_ceil(self.page_size);
        let mut data_pages: Vec<PageId> = (0..page_count).map(|_| self.allocate()).collect();
        data_pages.reverse();
        for (page, bytes) in data_pages.iter().zip(content.chunks(self.page_size)) {
            self.pages[*page as usize][..bytes.len()].copy_from_slice(bytes);
        }

        let inline_capacity = (self.page_size - OBJECT_PAGES_OFFSET) / 4;
        if !indirect && page_count <= inline_capacity {
            self.write_object_header(header, 0, content.len() as u64, &data_pages);
            return;
        }

        let per_index_page = self.page_size / 4;
        let index_pages: Vec<PageId> = data_pages
            .chunks(per_index_page)
            .map(|entries| {
                let index_page = self.allocate();
                let page = &mut self.pages[index_page as usize];
                for (slot, entry) in entries.iter().enumerate() {
                    page[slot * 4..slot * 4 + 4].copy_from_slice(&entry.to_le_bytes());
                }
                index_page
            })
            .collect();
        self.write_object_header(header, 1, content.len() as u64, &index_pages);
    }

    fn write_object_header(&mut self, page: PageId, level: u8, length: u64, entries: &[PageId]) {
        let page = &mut self.pages[page as usize];
        page[..2].copy_from_slice(&OBJECT_SIGNATURE);
        page[2] = level;
        page[OBJECT_LENGTH_OFFSET..OBJECT_LENGTH_OFFSET + 8].copy_from_slice(&length.to_le_bytes());
        for (slot, entry) in entries.iter().enumerate() {
            let offset = OBJECT_PAGES_OFFSET + slot * 4;
            page[offset..offset + 4].copy_from_slice(&entry.to_le_bytes());
        }
    }

    fn finish(mut self) -> Vec<u8> {
        let header = DatabaseHeader {
            page_count: self.pages.len() as i32,
            page_size: self.page_size as u32,
            ..DatabaseHeader::default()
        };
        self.pages[0][..FILE_HEADER_SIZE].copy_from_slice(&header.to_bytes());
        self.pages.concat()
    }
}

fn chunks_for(len: usize) -> usize {
    len.div_ceil(BLOB_CHUNK_PAYLOAD).max(1)
}

/// Blob object content: chunk 0 is left empty, then each blob as a chain of
/// consecutive chunks.
pub fn blob_area(blobs: &[&[u8]]) -> Vec<u8> {
    let mut area = vec![0u8; BLOB_CHUNK_SIZE];
    for blob in blobs {
        let pieces: Vec<&[u8]> = if blob.is_empty() {
            vec![&blob[..]]
        } else {
            blob.chunks(BLOB_CHUNK_PAYLOAD).collect()
        };
        let count = pieces.len();
        for (position, piece) in pieces.into_iter().enumerate() {
            let next = if position + 1 == count {
                0
            } else {
                (area.len() / BLOB_CHUNK_SIZE + 1) as u32
            };
            area.extend_from_slice(&encode_chunk(next, piece));
        }
    }
    area
}

/// One 256-byte chunk.
pub fn encode_chunk(next: ChunkNumber, payload: &[u8]) -> Vec<u8> {
    let mut chunk = vec![0u8; BLOB_CHUNK_SIZE];
    chunk[..4].copy_from_slice(&next.to_le_bytes());
    chunk[4..6].copy_from_slice(&(payload.len() as u16).to_le_bytes());
    chunk[6..6 + payload.len()].copy_from_slice(payload);
    chunk
}

pub fn encode_blob_ref(chunk: ChunkNumber, length: u32) -> Vec<u8> {
    let mut bytes = chunk.to_le_bytes().to_vec();
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes
}

/// Packed decimal with the sign nibble first; `digits` is left-padded with
/// zeros to fill `length / 2 + 1` bytes.
pub fn encode_numeric(negative: bool, digits: &str, length: usize) -> Vec<u8> {
    let nibble_count = (length / 2 + 1) * 2;
    let mut nibbles = vec![u8::from(!negative)];
    nibbles.extend(std::iter::repeat_n(0, (nibble_count - 1).saturating_sub(digits.len())));
    nibbles.extend(digits.bytes().map(|digit| digit - b'0'));
    nibbles
        .chunks(2)
        .map(|pair| pair[0] << 4 | pair.get(1).copied().unwrap_or(0))
        .collect()
}

pub fn encode_datetime(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Vec<u8> {
    let bcd = |value: u32| ((value / 10 % 10) << 4 | value % 10) as u8;
    vec![
        bcd(year / 100),
        bcd(year % 100),
        bcd(month),
        bcd(day),
        bcd(hour),
        bcd(minute),
        bcd(second),
    ]
}

pub fn encode_utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Length-prefixed text padded with spaces to `max_chars`.
pub fn encode_var_text(text: &str, max_chars: usize) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().take(max_chars).collect();
    let mut bytes = (units.len() as u16).to_le_bytes().to_vec();
    bytes.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
    bytes.extend(std::iter::repeat_n([32u8, 0u8], max_chars - units.len()).flatten());
    bytes
}
