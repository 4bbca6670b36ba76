use std::fmt;

use serde::Serialize;

use crate::types::{
    MAX_ROW_LENGTH, MIN_ROW_LENGTH, ROW_VERSION_SIZE,
    error::{DatabaseError, Result},
};

/// Field type tags as they appear in a table description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    /// `B`: fixed-length binary
    Binary,
    /// `L`: boolean
    Boolean,
    /// `N`: packed decimal
    Numeric,
    /// `NC`: fixed-width UTF-16 text
    FixedText,
    /// `NVC`: length-prefixed UTF-16 text
    VarText,
    /// `RV`: row version
    RowVersion,
    /// `NT`: unlimited text stored in the blob area
    Text,
    /// `I`: binary stored in the blob area
    Image,
    /// `DT`: packed date-time
    DateTime,
}

impl FieldType {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "B" => Ok(FieldType::Binary),
            "L" => Ok(FieldType::Boolean),
            "N" => Ok(FieldType::Numeric),
            "NC" => Ok(FieldType::FixedText),
            "NVC" => Ok(FieldType::VarText),
            "RV" => Ok(FieldType::RowVersion),
            "NT" => Ok(FieldType::Text),
            "I" => Ok(FieldType::Image),
            "DT" => Ok(FieldType::DateTime),
            _ => Err(DatabaseError::UnknownFieldType(tag.to_string())),
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            FieldType::Binary => "B",
            FieldType::Boolean => "L",
            FieldType::Numeric => "N",
            FieldType::FixedText => "NC",
            FieldType::VarText => "NVC",
            FieldType::RowVersion => "RV",
            FieldType::Text => "NT",
            FieldType::Image => "I",
            FieldType::DateTime => "DT",
        }
    }

    /// Bytes a value of this type occupies in a row, not counting the
    /// nullable presence flag. `None` when the declared length overflows.
    pub fn byte_size(&self, length: usize) -> Option<usize> {
        match self {
            FieldType::Binary => Some(length),
            FieldType::Boolean => Some(1),
            FieldType::Numeric => Some(length / 2 + 1),
            FieldType::FixedText => length.checked_mul(2),
            FieldType::VarText => length.checked_mul(2)?.checked_add(2),
            FieldType::RowVersion => Some(ROW_VERSION_SIZE),
            FieldType::Text | FieldType::Image => Some(8),
            FieldType::DateTime => Some(7),
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Image)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Byte size for a raw type tag and declared length.
pub fn field_size(tag: &str, length: usize) -> Result<usize> {
    FieldType::from_tag(tag)?
        .byte_size(length)
        .ok_or_else(|| DatabaseError::FieldTooLarge {
            tag: tag.to_string(),
            length,
        })
}

/// A column of a table as declared in its description, with its position
/// inside the fixed-length row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub length: usize,
    pub precision: usize,
    pub case_sensitive: bool,
    pub offset: usize,
    pub byte_len: usize,
}

impl Field {
    pub fn new(name: String, field_type: FieldType, length: usize, precision: usize) -> Self {
        let mut field = Self {
            name,
            field_type,
            nullable: false,
            length,
            precision,
            case_sensitive: false,
            offset: 0,
            byte_len: 0,
        };
        field.byte_len = field.compute_byte_len();
        field
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self.byte_len = self.compute_byte_len();
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Saturates on overflow; [`layout_fields`] rejects such a row.
    fn compute_byte_len(&self) -> usize {
        self.field_type
            .byte_size(self.length)
            .and_then(|size| size.checked_add(usize::from(self.nullable)))
            .unwrap_or(usize::MAX)
    }
}

/// Assigns row offsets to `fields` in place and returns the row length.
///
/// Byte 0 of a row is the liveness flag. A row-version field, if present,
/// always sits at offset 1 and the rest follow it. `None` when the row would
/// be longer than [`MAX_ROW_LENGTH`].
pub fn layout_fields(fields: &mut [Field]) -> Option<usize> {
    let mut offset: usize = 1;
    if let Some(version) = fields
        .iter_mut()
        .find(|field| field.field_type == FieldType::RowVersion)
    {
        version.offset = 1;
        offset = offset.checked_add(version.byte_len)?;
    }
    for field in fields
        .iter_mut()
        .filter(|field| field.field_type != FieldType::RowVersion)
    {
        field.offset = offset;
        offset = offset.checked_add(field.byte_len)?;
    }
    (offset <= MAX_ROW_LENGTH).then_some(offset.max(MIN_ROW_LENGTH))
}
