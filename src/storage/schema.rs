//! Table description grammar.
//!
//! ```text
//! {"IBVERSION",0,
//! {"Fields",
//! {"IBVERSION","N",0,10,0,"CS"},
//! {"PLATFORMVERSIONREQ","N",0,10,0,"CS"}
//! },
//! {"Indexes"},
//! {"Recordlock","0"},
//! {"Files",20,0,0}
//! }
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    storage::table::{Table, TableFiles},
    types::{
        ChunkNumber,
        codec::decode_utf16,
        error::{DatabaseError, Result},
        field::{Field, FieldType},
    },
};

static TABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)^\{"([^"]+)",\d+,\s*"#,
        r#"\{"Fields",?\s*(.*?)\s*\},\s*"#,
        r#"\{"Indexes"(.*)\},\s*"#,
        r#"\{"Recordlock","(\d+)"\},\s*"#,
        r#"\{"Files",(\d+),(\d+),(\d+)\}\s*\}$"#,
    ))
    .expect("table description pattern is valid")
});

static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{"([^"]+)","(\w+)",(\d+),(\d+),(\d+),"(\w+)"\}"#)
        .expect("field description pattern is valid")
});

static TABLE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\{"([^"]+)""#).expect("table name pattern is valid"));

/// Text of a description blob. Descriptions written as UTF-16LE are
/// recognised by a BOM or by a zero high byte in the first code unit.
pub fn decode_description(bytes: &[u8]) -> String {
    let text = match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest),
        [_, 0, ..] => decode_utf16(bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    text.trim_start_matches('\u{feff}').trim().to_string()
}

/// Parses one table description. `descriptor` is the chunk the text was
/// read from, used to name the table in errors.
pub fn parse_table_description(text: &str, descriptor: ChunkNumber) -> Result<Table> {
    let text = text.trim();
    let Some(captures) = TABLE_PATTERN.captures(text) else {
        let table = TABLE_NAME_PATTERN
            .captures(text)
            .map(|captures| captures[1].to_string())
            .unwrap_or_else(|| format!("#{descriptor}"));
        return Err(DatabaseError::MalformedSchema {
            table,
            reason: "description does not match the table grammar".to_string(),
        });
    };

    let name = captures[1].to_string();
    let fields = parse_fields(&name, &captures[2])?;
    let record_lock = &captures[4] == "1";
    let files = TableFiles {
        data: parse_number(&name, &captures[5])?,
        blob: parse_number(&name, &captures[6])?,
        index: parse_number(&name, &captures[7])?,
    };

    Table::new(name, fields, record_lock, files, descriptor)
}

fn parse_fields(table: &str, body: &str) -> Result<Vec<Field>> {
    let fields = FIELD_PATTERN
        .captures_iter(body)
        .map(|captures| parse_field(table, &captures))
        .collect::<Result<Vec<_>>>()?;
    // every entry opens with `{"`, so anything the pattern skipped shows up here
    if fields.len() != body.matches("{\"").count() {
        return Err(DatabaseError::MalformedSchema {
            table: table.to_string(),
            reason: "field list contains unparseable entries".to_string(),
        });
    }
    Ok(fields)
}

fn parse_field(table: &str, captures: &Captures<'_>) -> Result<Field> {
    let field_type = FieldType::from_tag(&captures[2]).map_err(|err| DatabaseError::MalformedSchema {
        table: table.to_string(),
        reason: format!("field '{}': {}", &captures[1], err),
    })?;
    let nullable = &captures[3] != "0";
    let length = parse_number(table, &captures[4])?;
    let precision = parse_number(table, &captures[5])?;

    let mut field = Field::new(captures[1].to_string(), field_type, length, precision);
    if nullable {
        field = field.nullable();
    }
    if &captures[6] == "CS" {
        field = field.case_sensitive();
    }
    Ok(field)
}

fn parse_number<T: std::str::FromStr>(table: &str, digits: &str) -> Result<T> {
    digits.parse().map_err(|_| DatabaseError::MalformedSchema {
        table: table.to_string(),
        reason: format!("number '{}' out of range", digits),
    })
}
