use serde::Serialize;

use crate::types::{RowIndex, value::Value};

/// Liveness of a raw row buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Alive,
    Deleted,
    Nonexistent,
}

impl RowState {
    pub fn classify(bytes: &[u8]) -> Self {
        if bytes.iter().all(|byte| *byte == 0) {
            RowState::Nonexistent
        } else if bytes[0] == 1 {
            RowState::Deleted
        } else {
            RowState::Alive
        }
    }
}

/// A decoded alive row. Values keep the table's field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub index: RowIndex,
    pub values: Vec<(String, Value)>,
}

impl Row {
    pub fn new(index: RowIndex, values: Vec<(String, Value)>) -> Self {
        Self { index, values }
    }

    pub fn get_value(&self, field_name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, value)| value)
    }

    /// Field name to rendered text, in field order.
    pub fn to_text(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowResult {
    Alive(Row),
    Deleted,
    NotFound,
}

impl RowResult {
    pub fn is_alive(&self) -> bool {
        matches!(self, RowResult::Alive(_))
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            RowResult::Alive(row) => Some(row),
            _ => None,
        }
    }
}
