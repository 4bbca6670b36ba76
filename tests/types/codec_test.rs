use onecd::types::{
    codec::{decode_blob_ref, decode_datetime, decode_field, decode_numeric, decode_utf16, decode_var_text},
    field::{Field, FieldType},
    value::{BlobRef, Value},
};

fn manager_title_bytes() -> Vec<u8> {
    let mut bytes = vec![
        20, 0, 28, 4, 53, 4, 61, 4, 53, 4, 52, 4, 54, 4, 53, 4, 64, 4, 32, 0, 63, 4, 62, 4, 32, 0, 55, 4, 48, 4,
        58, 4, 67, 4, 63, 4, 58, 4, 48, 4, 60, 4,
    ];
    while bytes.len() < 50 {
        bytes.extend_from_slice(&[32, 0]);
    }
    bytes
}

#[test]
fn test_var_text_uses_length_prefix() {
    let text = decode_var_text(&manager_title_bytes(), 20).unwrap();
    assert_eq!(text, "Менеджер по закупкам");
    assert_eq!(text.chars().count(), 20);
}

#[test]
fn test_var_text_field_decodes_through_field_layout() {
    let field = Field::new("DESCRIPTION".to_string(), FieldType::VarText, 20, 0);
    assert_eq!(field.byte_len, 42);
    let bytes = manager_title_bytes();
    let value = decode_field(&field, &bytes[..field.byte_len], 0);
    assert_eq!(value, Value::Text("Менеджер по закупкам".to_string()));
}

#[test]
fn test_var_text_count_is_clamped() {
    let bytes = manager_title_bytes();
    assert_eq!(decode_var_text(&bytes, 8).unwrap(), "Менеджер");

    // count larger than the bytes present
    let short = [200, 0, 65, 0, 66, 0];
    assert_eq!(decode_var_text(&short, 255).unwrap(), "AB");
    assert_eq!(decode_var_text(&[7], 10), None);
}

#[test]
fn test_datetime_decoding() {
    let value = decode_datetime(&[32, 19, 4, 3, 20, 65, 33]).unwrap();
    assert_eq!(value.to_string(), "2013.04.03 14:41:21");
    assert!(matches!(value, Value::Timestamp(_)));
}

#[test]
fn test_empty_datetime_renders_digits() {
    let value = decode_datetime(&[0; 7]).unwrap();
    assert_eq!(value, Value::Text("0000.00.00 00:00:00".to_string()));

    let empty_date = decode_datetime(&[0x00, 0x01, 0x01, 0x01, 0, 0, 0]).unwrap();
    assert_eq!(empty_date.to_string(), "0001.01.01 00:00:00");
}

#[test]
fn test_datetime_rejects_non_decimal_nibbles() {
    assert_eq!(decode_datetime(&[0x2A, 19, 4, 3, 20, 65, 33]), None);
    assert_eq!(decode_datetime(&[32, 19, 4]), None);
}

#[test]
fn test_numeric_decoding() {
    let decimal = decode_numeric(&[24, 71, 35], 3).unwrap();
    assert_eq!(decimal.mantissa, 84723);
    assert_eq!(decimal.scale, 4);
    assert_eq!(decimal.to_string(), "8.4723");
}

#[test]
fn test_numeric_sign_nibble() {
    // sign nibble 0 is negative
    let decimal = decode_numeric(&[0x08, 0x47, 0x23], 3).unwrap();
    assert_eq!(decimal.to_string(), "-8.4723");
}

#[test]
fn test_numeric_formatting() {
    assert_eq!(decode_numeric(&[0x10, 0x00, 0x00], 0).unwrap().to_string(), "0");
    assert_eq!(decode_numeric(&[0x10, 0x00, 0x80], 0).unwrap().to_string(), "8");
    assert_eq!(decode_numeric(&[0x10, 0x00, 0x05], 1).unwrap().to_string(), "0.05");
    assert_eq!(decode_numeric(&[0x11, 0x23, 0x40], 2).unwrap().to_string(), "12.34");
}

#[test]
fn test_numeric_rejects_invalid_digits() {
    assert_eq!(decode_numeric(&[0x1F, 0x00], 0), None);
    assert_eq!(decode_numeric(&[], 0), None);
}

#[test]
fn test_boolean_and_nullable_fields() {
    let flag = Field::new("ACTIVE".to_string(), FieldType::Boolean, 0, 0);
    assert_eq!(decode_field(&flag, &[0], 0), Value::Boolean(false));
    assert_eq!(decode_field(&flag, &[7], 0), Value::Boolean(true));

    let nullable = Field::new("ACTIVE".to_string(), FieldType::Boolean, 0, 0).nullable();
    assert_eq!(nullable.byte_len, 2);
    assert_eq!(decode_field(&nullable, &[0, 1], 0), Value::Null);
    assert_eq!(decode_field(&nullable, &[1, 1], 0), Value::Boolean(true));
    assert_eq!(Value::Null.to_string(), "");
}

#[test]
fn test_fixed_text() {
    let field = Field::new("CODE".to_string(), FieldType::FixedText, 4, 0);
    let bytes: Vec<u8> = "AБ  ".encode_utf16().flat_map(u16::to_le_bytes).collect();
    assert_eq!(decode_field(&field, &bytes, 0), Value::Text("AБ  ".to_string()));
    assert_eq!(decode_utf16(&[65, 0, 66]), "A");
}

#[test]
fn test_blob_fields_decode_to_references() {
    let field = Field::new("BODY".to_string(), FieldType::Image, 0, 0);
    let bytes = [3, 0, 0, 0, 0x2C, 0x01, 0, 0];
    let value = decode_field(&field, &bytes, 41);
    let reference = BlobRef {
        blob_page: 41,
        chunk: 3,
        length: 300,
    };
    assert_eq!(value, Value::BlobRef(reference));
    assert_eq!(value.to_string(), "blob/41/3/300");
    assert_eq!(BlobRef::parse("blob/41/3/300"), Some(reference));
    assert_eq!(BlobRef::parse("blob/41/3"), None);
    assert_eq!(decode_blob_ref(&[1, 2, 3], 41), None);
}

#[test]
fn test_unknown_layouts_fall_back_to_hex() {
    let version = Field::new("_VERSION".to_string(), FieldType::RowVersion, 0, 0);
    let bytes = [0x1C, 0xFD, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 255];
    let value = decode_field(&version, &bytes, 0);
    assert_eq!(value, Value::Raw(bytes.to_vec()));
    assert_eq!(value.to_string(), "1c fd 00 01 02 03 04 05 06 07 08 09 0a 0b 0c ff");

    let numeric = Field::new("SUM".to_string(), FieldType::Numeric, 3, 0);
    assert_eq!(decode_field(&numeric, &[0x1A, 0xBC], 0).to_string(), "1a bc");
}

#[test]
fn test_decoding_is_deterministic() {
    let field = Field::new("DESCRIPTION".to_string(), FieldType::VarText, 20, 0);
    let bytes = manager_title_bytes();
    let first = decode_field(&field, &bytes[..42], 0);
    let second = decode_field(&field, &bytes[..42], 0);
    assert_eq!(first, second);
}
