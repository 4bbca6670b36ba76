use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    executor::{row_reader::RowReader, sequential_scan::TableScanner},
    storage::{
        allocation::{BlockList, resolve_block_list},
        blob::{read_blob_stream, read_blob_value},
        catalog::{TableCatalog, TableDirectory},
        header::DatabaseHeader,
        options::StorageOptions,
        pager::{PageSource, Pager},
        table::Table,
    },
    types::{
        ChunkNumber, DIRECTORY_FIRST_CHUNK, FILE_HEADER_SIZE, PageId, ROOT_OBJECT_PAGE, RowIndex,
        error::{DatabaseError, Result},
        row::RowResult,
        value::BlobRef,
    },
};

pub struct DatabaseInfo {
    pub path: Option<PathBuf>,
    pub header: DatabaseHeader,
    pub file_size: u64,
}

/// An open, read-only database: header, table catalog and the file.
pub struct StorageManager {
    pub db_info: DatabaseInfo,
    pager: Pager,
    root_blocks: BlockList,
    catalog: TableCatalog,
    options: StorageOptions,
}

impl StorageManager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, StorageOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: StorageOptions) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening database");
        let file = File::open(path)?;
        let mut storage_manager = Self::from_source(Box::new(file), options)?;
        storage_manager.db_info.path = Some(path.to_path_buf());
        Ok(storage_manager)
    }

    /// Opens a database held by any seekable reader.
    pub fn from_source(mut source: Box<dyn PageSource>, options: StorageOptions) -> Result<Self> {
        let file_size = source.seek(SeekFrom::End(0))?;
        let header = Self::read_header(source.as_mut())?;
        info!(
            page_size = header.page_size,
            page_count = header.page_count,
            file_size,
            "database header accepted"
        );

        let pager = Pager::new(source, header.page_size);
        let root_blocks = resolve_block_list(&pager, ROOT_OBJECT_PAGE, options.verify_object_signature)?;
        let directory_bytes = read_blob_stream(&pager, &root_blocks, DIRECTORY_FIRST_CHUNK)?;
        let directory = TableDirectory::from_bytes(&directory_bytes)?;
        let catalog = TableCatalog::build(&pager, &root_blocks, &directory, options.discovery_threads);

        Ok(Self {
            db_info: DatabaseInfo {
                path: None,
                header,
                file_size,
            },
            pager,
            root_blocks,
            catalog,
            options,
        })
    }

    fn read_header(source: &mut dyn PageSource) -> Result<DatabaseHeader> {
        let mut buffer = vec![0u8; FILE_HEADER_SIZE];
        source.seek(SeekFrom::Start(0))?;
        source.read_exact(&mut buffer).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => DatabaseError::InvalidFormat {
                reason: "Header too short".to_string(),
            },
            _ => DatabaseError::Io(err),
        })?;
        DatabaseHeader::from_bytes(&buffer)
    }

    pub fn page_size(&self) -> u32 {
        self.db_info.header.page_size
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn root_blocks(&self) -> &BlockList {
        &self.root_blocks
    }

    /// Get all table names, sorted
    pub fn get_table_names(&self) -> Vec<String> {
        self.catalog.table_names().to_vec()
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> bool {
        self.catalog.table_exists(table_name)
    }

    /// Get table schema by name
    pub fn get_table_schema(&self, table_name: &str) -> Result<&Table> {
        self.catalog
            .get_table(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })
    }

    /// Reads row `index` of a table. With `resolve_blobs` blob fields carry
    /// their content, otherwise a `blob/<page>/<chunk>/<length>` reference.
    pub fn get_row(&self, table_name: &str, index: RowIndex, resolve_blobs: bool) -> Result<RowResult> {
        let table = self.get_table_schema(table_name)?;
        RowReader::new(&self.pager, table, self.options.verify_object_signature)
            .read_row(index, resolve_blobs)
    }

    /// Reads a blob from the blob object at `blob_page`, as referenced by a
    /// row read without blob resolution.
    pub fn get_blob(&self, blob_page: PageId, chunk: ChunkNumber, length: u32) -> Result<Vec<u8>> {
        let reference = BlobRef {
            blob_page,
            chunk,
            length,
        };
        let owner = self
            .catalog
            .tables()
            .find(|table| table.files.blob == blob_page);
        match owner {
            Some(table) => match table.blob_blocks(&self.pager, self.options.verify_object_signature)? {
                Some(blocks) => read_blob_value(&self.pager, blocks, &reference),
                None => Ok(Vec::new()),
            },
            None if blob_page == 0 => Ok(Vec::new()),
            None => {
                let blocks = resolve_block_list(&self.pager, blob_page, self.options.verify_object_signature)?;
                read_blob_value(&self.pager, &blocks, &reference)
            }
        }
    }

    /// Create a scanner over the alive rows of a table
    pub fn create_scanner(&self, table_name: &str, resolve_blobs: bool) -> Result<TableScanner<'_>> {
        TableScanner::new(self, table_name, resolve_blobs)
    }
}
