use crate::types::{
    BLOB_CHUNK_SIZE, FILE_HEADER_SIZE, FILE_MAGIC, MAX_PAGE_SIZE, SUPPORTED_VERSION,
    cursor::ByteCursor,
    error::{DatabaseError, Result},
};

/// The 24-byte file header: `8s 4b i I I`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHeader {
    pub magic: [u8; 8],
    pub version: [u8; 4],
    pub page_count: i32,
    pub unknown: u32,
    pub page_size: u32,
}

impl Default for DatabaseHeader {
    fn default() -> Self {
        Self {
            magic: *FILE_MAGIC,
            version: SUPPORTED_VERSION,
            page_count: 0,
            unknown: 0,
            page_size: 4096,
        }
    }
}

impl DatabaseHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(FILE_HEADER_SIZE);

        buffer.extend_from_slice(&self.magic);
        buffer.extend_from_slice(&self.version);
        buffer.extend_from_slice(&self.page_count.to_le_bytes());
        buffer.extend_from_slice(&self.unknown.to_le_bytes());
        buffer.extend_from_slice(&self.page_size.to_le_bytes());

        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(DatabaseError::InvalidFormat {
                reason: "Header too short".to_string(),
            });
        }

        let mut cursor = ByteCursor::new(bytes);

        let magic = cursor.read_array::<8>()?;
        if &magic != FILE_MAGIC {
            return Err(DatabaseError::InvalidFormat {
                reason: "Invalid 1CDBMSV8 signature".to_string(),
            });
        }

        let version = cursor.read_array::<4>()?;
        if version != SUPPORTED_VERSION {
            return Err(DatabaseError::UnsupportedVersion { version });
        }

        let page_count = cursor.read_i32_le()?;
        let unknown = cursor.read_u32_le()?;

        let page_size = cursor.read_u32_le()?;
        if !page_size.is_power_of_two() || !(BLOB_CHUNK_SIZE..=MAX_PAGE_SIZE).contains(&(page_size as usize)) {
            return Err(DatabaseError::InvalidFormat {
                reason: format!("Unsupported page size: {}", page_size),
            });
        }

        Ok(Self {
            magic,
            version,
            page_count,
            unknown,
            page_size,
        })
    }
}
