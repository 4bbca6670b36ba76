use onecd::{
    executor::row_reader::{RowReader, decode_row},
    types::{row::RowResult, value::Value},
    utils::mock::{MockDatabase, MockField, MockTable, encode_var_text},
};

use super::{NOTES, nomenclature, nomenclature_database};

#[test]
fn test_layout_matches_description() {
    let (fields, row_length) = nomenclature().layout();
    let offsets: Vec<usize> = fields.iter().map(|field| field.offset).collect();
    assert_eq!(offsets, vec![1, 17, 59, 66, 67, 74]);
    assert_eq!(row_length, 82);

    let storage = nomenclature_database().open().unwrap();
    assert_eq!(storage.get_table_schema("NOMENCLATURE").unwrap().row_length, 82);
}

#[test]
fn test_alive_row_values() {
    let storage = nomenclature_database().open().unwrap();
    let row = storage.get_row("NOMENCLATURE", 1, false).unwrap().into_row().unwrap();
    assert_eq!(row.index, 1);

    let text: Vec<(String, String)> = row.to_text();
    let names: Vec<&str> = text.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["ID", "DESCR", "PRICE", "ACTIVE", "CREATED", "NOTES"]);

    assert_eq!(text[0].1, vec!["01"; 16].join(" "));
    assert_eq!(text[1].1, "Bolt M6");
    assert_eq!(text[2].1, "12.345");
    assert_eq!(text[3].1, "true");
    assert_eq!(text[4].1, "2023.04.15 09:30:05");
    assert_eq!(text[5].1, format!("blob/{}/0/0", storage.get_table_schema("NOMENCLATURE").unwrap().files.blob));
}

#[test]
fn test_row_states() {
    let storage = nomenclature_database().open().unwrap();
    let states: Vec<RowResult> = (0..6)
        .map(|index| storage.get_row("NOMENCLATURE", index, false).unwrap())
        .collect();
    assert_eq!(states[0], RowResult::Deleted);
    assert!(states[1].is_alive());
    assert!(states[2].is_alive());
    assert_eq!(states[3], RowResult::Deleted);
    assert!(states[4].is_alive());
    assert_eq!(states[5], RowResult::NotFound);
    assert_eq!(storage.get_row("NOMENCLATURE", 100, false).unwrap(), RowResult::NotFound);
    assert_eq!(storage.get_row("NOMENCLATURE", u64::MAX, false).unwrap(), RowResult::NotFound);
}

#[test]
fn test_null_price_and_empty_date() {
    let storage = nomenclature_database().open().unwrap();
    let row = storage.get_row("NOMENCLATURE", 4, false).unwrap().into_row().unwrap();
    assert_eq!(row.get_value("PRICE"), Some(&Value::Null));
    assert_eq!(row.get_value("ACTIVE"), Some(&Value::Boolean(false)));
    assert_eq!(row.get_value("CREATED").unwrap().to_string(), "0000.00.00 00:00:00");
}

#[test]
fn test_blob_resolution() {
    let storage = nomenclature_database().open().unwrap();

    let unresolved = storage.get_row("NOMENCLATURE", 4, false).unwrap().into_row().unwrap();
    let Some(Value::BlobRef(reference)) = unresolved.get_value("NOTES") else {
        panic!("expected a blob reference");
    };
    assert_eq!(reference.length as usize, NOTES.len() * 10);

    let resolved = storage.get_row("NOMENCLATURE", 4, true).unwrap().into_row().unwrap();
    assert_eq!(resolved.get_value("NOTES"), Some(&Value::Blob(NOTES.repeat(10))));

    // zero-length reference reads nothing
    let empty = storage.get_row("NOMENCLATURE", 1, true).unwrap().into_row().unwrap();
    assert_eq!(empty.get_value("NOTES"), Some(&Value::Blob(Vec::new())));
}

#[test]
fn test_rows_spanning_pages() {
    let mut table = MockTable::new("WIDE", vec![MockField::new("NAME", "NC", 60, 0)]);
    let names: Vec<String> = (0..10).map(|row| format!("{row:-<60}")).collect();
    for name in &names {
        let bytes: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
        table.push_row(&[("NAME", bytes)]);
    }
    assert_eq!(table.row_length(), 121);

    let mut db = MockDatabase::new().with_page_size(256);
    db.add_table(table);
    let storage = db.open().unwrap();

    for (index, name) in names.iter().enumerate() {
        let row = storage.get_row("WIDE", index as u64, false).unwrap().into_row().unwrap();
        assert_eq!(row.get_value("NAME").and_then(|value| value.as_text()), Some(name.as_str()));
    }
    assert_eq!(storage.get_row("WIDE", 10, false).unwrap(), RowResult::NotFound);
}

#[test]
fn test_indirect_data_object() {
    let mut table = MockTable::new("JOURNAL", vec![MockField::new("LINE", "NVC", 10, 0)]).indirect();
    for line in 0..150 {
        table.push_row(&[("LINE", encode_var_text(&format!("line {line}"), 10))]);
    }
    let mut db = MockDatabase::new().with_page_size(256);
    db.add_table(table);
    let storage = db.open().unwrap();

    for index in [0u64, 9, 10, 77, 149] {
        let row = storage.get_row("JOURNAL", index, false).unwrap().into_row().unwrap();
        assert_eq!(row.get_value("LINE").unwrap().to_string(), format!("line {index}"));
    }
    assert_eq!(storage.get_row("JOURNAL", 150, false).unwrap(), RowResult::NotFound);
}

#[test]
fn test_table_without_data_object() {
    let mut db = MockDatabase::new();
    db.add_table(MockTable::new("EMPTY", vec![MockField::new("ID", "B", 16, 0)]));
    let storage = db.open().unwrap();
    assert_eq!(storage.get_row("EMPTY", 0, true).unwrap(), RowResult::NotFound);
}

#[test]
fn test_reader_and_decoder_agree() {
    let storage = nomenclature_database().open().unwrap();
    let table = storage.get_table_schema("NOMENCLATURE").unwrap();
    let reader = RowReader::new(storage.pager(), table, true);
    let blocks = table.data_blocks(storage.pager(), true).unwrap().unwrap();

    let raw = reader.read_raw(blocks, 2).unwrap().unwrap();
    assert_eq!(raw.len(), 82);
    assert_eq!(decode_row(table, 2, &raw), reader.read_row(2, false).unwrap());
    assert!(reader.read_raw(blocks, 10_000).unwrap().is_none());
}

#[test]
fn test_unreadable_blob_object_keeps_the_row() {
    let db = nomenclature_database();
    let blob_page = db.open().unwrap().get_table_schema("NOMENCLATURE").unwrap().files.blob;

    let mut bytes = db.build();
    // an allocation level the reader does not know
    bytes[blob_page as usize * 4096 + 2] = 7;
    let storage = onecd::StorageManager::from_source(
        Box::new(std::io::Cursor::new(bytes)),
        onecd::storage::options::StorageOptions::default(),
    )
    .unwrap();

    let row = storage.get_row("NOMENCLATURE", 4, true).unwrap().into_row().unwrap();
    assert_eq!(row.get_value("NOTES"), Some(&Value::Blob(Vec::new())));
    assert_eq!(row.get_value("DESCR").unwrap().to_string(), "Washer");
    assert!(matches!(
        storage.get_blob(blob_page, 1, 10),
        Err(onecd::DatabaseError::UnsupportedFatLevel { level: 7, .. })
    ));
}
