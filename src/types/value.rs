use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::{
    types::{ChunkNumber, PageId},
    utils::hex::hex_dump,
};

/// Location of a blob value that has not been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlobRef {
    pub blob_page: PageId,
    pub chunk: ChunkNumber,
    pub length: u32,
}

impl BlobRef {
    /// Parses the `blob/<page>/<chunk>/<length>` form produced by `Display`.
    pub fn parse(reference: &str) -> Option<Self> {
        let mut parts = reference.strip_prefix("blob/")?.split('/');
        let blob_page = parts.next()?.parse().ok()?;
        let chunk = parts.next()?.parse().ok()?;
        let length = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            blob_page,
            chunk,
            length,
        })
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob/{}/{}/{}", self.blob_page, self.chunk, self.length)
    }
}

/// Packed decimal as a signed integer mantissa and a decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    pub mantissa: i128,
    pub scale: u32,
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let (whole, fraction) = if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            (whole.to_string(), fraction.to_string())
        } else {
            ("0".to_string(), format!("{digits:0>scale$}"))
        };
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            if whole == "0" {
                write!(f, "0")
            } else {
                write!(f, "{sign}{whole}")
            }
        } else {
            write!(f, "{sign}{whole}.{fraction}")
        }
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Numeric(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
    Blob(Vec<u8>),
    BlobRef(BlobRef),
    Raw(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Numeric(decimal) => write!(f, "{decimal}"),
            Value::Text(text) => f.write_str(text),
            Value::Timestamp(timestamp) => write!(f, "{}", timestamp.format("%Y.%m.%d %H:%M:%S")),
            Value::Blob(bytes) | Value::Raw(bytes) => f.write_str(&hex_dump(bytes)),
            Value::BlobRef(reference) => write!(f, "{reference}"),
        }
    }
}
