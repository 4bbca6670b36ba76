//! Per-type decoding of raw field bytes.
//!
//! All functions here are pure: they take the bytes a field occupies in a
//! row and never touch the file. Blob fields decode to a [`BlobRef`]; the
//! row reader decides whether to follow it.

use chrono::NaiveDate;

use crate::types::{
    PageId,
    cursor::ByteCursor,
    field::{Field, FieldType},
    value::{BlobRef, Decimal, Value},
};

/// Decodes the bytes of `field` taken from a row. `blob_page` is the
/// owning table's blob directory entry, used to build blob references.
pub fn decode_field(field: &Field, bytes: &[u8], blob_page: PageId) -> Value {
    let payload = if field.nullable {
        match bytes.split_first() {
            Some((&0, _)) | None => return Value::Null,
            Some((_, rest)) => rest,
        }
    } else {
        bytes
    };

    let decoded = match field.field_type {
        FieldType::Boolean => payload.first().map(|flag| Value::Boolean(*flag != 0)),
        FieldType::Numeric => decode_numeric(payload, field.precision).map(Value::Numeric),
        FieldType::DateTime => decode_datetime(payload),
        FieldType::FixedText => Some(Value::Text(decode_utf16(payload))),
        FieldType::VarText => decode_var_text(payload, field.length).map(Value::Text),
        FieldType::Text | FieldType::Image => {
            decode_blob_ref(payload, blob_page).map(Value::BlobRef)
        }
        FieldType::Binary | FieldType::RowVersion => None,
    };
    decoded.unwrap_or_else(|| Value::Raw(payload.to_vec()))
}

/// Packed decimal: the first nibble is the sign (0 negative), every
/// following nibble one decimal digit. The mantissa is scaled by
/// `precision + 1`.
pub fn decode_numeric(bytes: &[u8], precision: usize) -> Option<Decimal> {
    let mut nibbles = bytes.iter().flat_map(|byte| [byte >> 4, byte & 0x0F]);
    let negative = nibbles.next()? == 0;
    let mut mantissa: i128 = 0;
    for digit in nibbles {
        if digit > 9 {
            return None;
        }
        mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(digit))?;
    }
    Some(Decimal {
        mantissa: if negative { -mantissa } else { mantissa },
        scale: u32::try_from(precision).ok()?.checked_add(1)?,
    })
}

/// Both nibbles of a byte as a two-digit decimal number.
fn bcd_pair(byte: u8) -> Option<u32> {
    let (high, low) = (byte >> 4, byte & 0x0F);
    if high > 9 || low > 9 {
        return None;
    }
    Some(u32::from(high) * 10 + u32::from(low))
}

/// Seven packed bytes: century+year, month, day, hour, minute, second.
/// A date the calendar rejects (such as the all-zero empty date) is
/// rendered from its digits as text.
pub fn decode_datetime(bytes: &[u8]) -> Option<Value> {
    let digits = bytes
        .get(..7)?
        .iter()
        .map(|byte| bcd_pair(*byte))
        .collect::<Option<Vec<_>>>()?;
    let year = digits[0] * 100 + digits[1];
    let (month, day) = (digits[2], digits[3]);
    let (hour, minute, second) = (digits[4], digits[5], digits[6]);

    let timestamp = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second));
    Some(match timestamp {
        Some(timestamp) => Value::Timestamp(timestamp),
        None => Value::Text(format!(
            "{year:04}.{month:02}.{day:02} {hour:02}:{minute:02}:{second:02}"
        )),
    })
}

/// UTF-16LE code units; a trailing odd byte is ignored.
pub fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// A 2-byte character count followed by UTF-16LE text. The count is
/// clamped to the declared maximum and to the bytes actually present.
pub fn decode_var_text(bytes: &[u8], max_chars: usize) -> Option<String> {
    let mut cursor = ByteCursor::new(bytes);
    let count = usize::from(cursor.read_u16_le().ok()?);
    let count = count.min(max_chars).min(cursor.remaining() / 2);
    let text = cursor.read_bytes(count * 2).ok()?;
    Some(decode_utf16(text))
}

/// First chunk number and total length of a blob value.
pub fn decode_blob_ref(bytes: &[u8], blob_page: PageId) -> Option<BlobRef> {
    let mut cursor = ByteCursor::new(bytes);
    let chunk = cursor.read_u32_le().ok()?;
    let length = cursor.read_u32_le().ok()?;
    Some(BlobRef {
        blob_page,
        chunk,
        length,
    })
}
