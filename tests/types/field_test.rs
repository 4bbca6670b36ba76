use onecd::types::{
    error::DatabaseError,
    field::{Field, FieldType, field_size, layout_fields},
};

#[test]
fn test_field_size_table() {
    assert_eq!(field_size("B", 16).unwrap(), 16);
    assert_eq!(field_size("L", 0).unwrap(), 1);
    assert_eq!(field_size("N", 5).unwrap(), 3);
    assert_eq!(field_size("N", 10).unwrap(), 6);
    assert_eq!(field_size("NC", 9).unwrap(), 18);
    assert_eq!(field_size("NVC", 20).unwrap(), 42);
    assert_eq!(field_size("RV", 0).unwrap(), 16);
    assert_eq!(field_size("NT", 0).unwrap(), 8);
    assert_eq!(field_size("I", 0).unwrap(), 8);
    assert_eq!(field_size("DT", 0).unwrap(), 7);
}

#[test]
fn test_unknown_field_type_is_an_error() {
    for tag in ["X", "", "n", "NVCX"] {
        assert!(matches!(field_size(tag, 1), Err(DatabaseError::UnknownFieldType(_))));
    }
}

#[test]
fn test_type_tags_round_trip() {
    for tag in ["B", "L", "N", "NC", "NVC", "RV", "NT", "I", "DT"] {
        assert_eq!(FieldType::from_tag(tag).unwrap().as_tag(), tag);
    }
    assert!(FieldType::Text.is_blob());
    assert!(!FieldType::VarText.is_blob());
}

#[test]
fn test_nullable_fields_take_a_presence_byte() {
    let field = Field::new("PRICE".to_string(), FieldType::Numeric, 10, 2);
    assert_eq!(field.byte_len, 6);
    assert_eq!(field.nullable().byte_len, 7);
}

#[test]
fn test_offsets_accumulate_from_byte_one() {
    let mut fields = vec![
        Field::new("ID".to_string(), FieldType::Binary, 16, 0),
        Field::new("NAME".to_string(), FieldType::VarText, 10, 0).nullable(),
        Field::new("FLAG".to_string(), FieldType::Boolean, 0, 0),
    ];
    let row_length = layout_fields(&mut fields).unwrap();
    assert_eq!(fields[0].offset, 1);
    assert_eq!(fields[1].offset, 17);
    assert_eq!(fields[2].offset, 17 + 23);
    assert_eq!(row_length, 41);
}

#[test]
fn test_row_version_is_placed_first() {
    let mut fields = vec![
        Field::new("ID".to_string(), FieldType::Binary, 16, 0),
        Field::new("_VERSION".to_string(), FieldType::RowVersion, 0, 0),
        Field::new("FLAG".to_string(), FieldType::Boolean, 0, 0),
    ];
    let row_length = layout_fields(&mut fields).unwrap();
    assert_eq!(fields[1].offset, 1);
    assert_eq!(fields[0].offset, 17);
    assert_eq!(fields[2].offset, 33);
    assert_eq!(row_length, 34);
}

#[test]
fn test_minimum_row_length() {
    let mut fields = vec![Field::new("FLAG".to_string(), FieldType::Boolean, 0, 0)];
    assert_eq!(layout_fields(&mut fields), Some(5));
    assert_eq!(layout_fields(&mut []), Some(5));
}

#[test]
fn test_oversized_declarations_are_rejected() {
    assert!(matches!(
        field_size("NC", usize::MAX),
        Err(DatabaseError::FieldTooLarge { length: usize::MAX, .. })
    ));
    assert!(matches!(field_size("NVC", usize::MAX / 2), Err(DatabaseError::FieldTooLarge { .. })));
    assert_eq!(field_size("B", usize::MAX).unwrap(), usize::MAX);

    let huge = Field::new("F".to_string(), FieldType::FixedText, usize::MAX, 0);
    assert_eq!(huge.byte_len, usize::MAX);
    let mut fields = vec![Field::new("ID".to_string(), FieldType::Binary, 16, 0), huge];
    assert_eq!(layout_fields(&mut fields), None);

    let mut wide = vec![Field::new("BLOBISH".to_string(), FieldType::Binary, 1 << 40, 0)];
    assert_eq!(layout_fields(&mut wide), None);
}
