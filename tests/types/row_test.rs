use onecd::types::{
    row::{Row, RowResult, RowState},
    value::Value,
};

#[test]
fn test_row_classification() {
    assert_eq!(RowState::classify(&[0; 12]), RowState::Nonexistent);
    assert_eq!(RowState::classify(&[1, 0, 0, 0, 0]), RowState::Deleted);
    assert_eq!(RowState::classify(&[1, 9, 9, 9, 9, 9]), RowState::Deleted);
    assert_eq!(RowState::classify(&[0, 0, 0, 3, 0]), RowState::Alive);
    assert_eq!(RowState::classify(&[2, 0, 0, 0, 0]), RowState::Alive);
}

#[test]
fn test_row_accessors() {
    let row = Row::new(
        4,
        vec![
            ("CODE".to_string(), Value::Text("0001".to_string())),
            ("ACTIVE".to_string(), Value::Boolean(true)),
            ("NOTE".to_string(), Value::Null),
        ],
    );
    assert_eq!(row.get_value("ACTIVE"), Some(&Value::Boolean(true)));
    assert_eq!(row.get_value("MISSING"), None);
    assert_eq!(
        row.to_text(),
        vec![
            ("CODE".to_string(), "0001".to_string()),
            ("ACTIVE".to_string(), "true".to_string()),
            ("NOTE".to_string(), String::new()),
        ]
    );

    let result = RowResult::Alive(row.clone());
    assert!(result.is_alive());
    assert_eq!(result.into_row(), Some(row));
    assert_eq!(RowResult::Deleted.into_row(), None);
    assert!(!RowResult::NotFound.is_alive());
}
