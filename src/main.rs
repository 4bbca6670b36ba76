use std::path::PathBuf;

use clap::Parser;
use onecd::{
    StorageManager,
    executor::scan::Scanner,
    types::{error::DatabaseError, row::RowResult, value::BlobRef},
    utils::hex::hex_dump,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, prelude::*};

const DEFAULT_DATABASE: &str = "1Cv8.1CD";
const DEFAULT_ROWS: usize = 10;

/// Interactive inspector for 1CDBMSV8 database files.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the database file. Defaults to 1Cv8.1CD next to the executable.
    #[clap(short, long)]
    base: Option<PathBuf>,
}

fn database_path(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATABASE)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    })
}

fn print_help() {
    println!(
        r#"
Available commands:
  tables                       - List tables with field count and row length
  schema <table>               - Show a table description as JSON
  row <table> <n> [blobs]      - Show row n, optionally reading blob fields
  rows <table> [count]         - Show the first alive rows (default 10)
  blob <page> <chunk> <length> - Dump a blob referenced by a row
  help, h                      - Show this help message
  exit, quit, q                - Exit
"#
    );
}

fn list_tables(storage: &StorageManager) {
    println!("page size: {}", storage.page_size());
    println!("{:<40} {:>7} {:>10} {:>8} {:>8}", "Name", "Fields", "RowLength", "Data", "Blob");
    for table in storage.catalog().tables() {
        println!(
            "{:<40} {:>7} {:>10} {:>8} {:>8}",
            table.name,
            table.fields.len(),
            table.row_length,
            table.files.data,
            table.files.blob
        );
    }
}

fn show_schema(storage: &StorageManager, name: &str) -> Result<(), DatabaseError> {
    let table = storage.get_table_schema(name)?;
    let json = serde_json::to_string_pretty(table).map_err(|err| DatabaseError::InvalidFormat {
        reason: err.to_string(),
    })?;
    println!("{json}");
    Ok(())
}

fn show_row(storage: &StorageManager, name: &str, index: u64, resolve_blobs: bool) -> Result<(), DatabaseError> {
    match storage.get_row(name, index, resolve_blobs)? {
        RowResult::Alive(row) => {
            for (field, value) in row.to_text() {
                println!("{field:<32} {value}");
            }
        }
        RowResult::Deleted => println!("row {index} is deleted"),
        RowResult::NotFound => println!("row {index} not found"),
    }
    Ok(())
}

fn show_rows(storage: &StorageManager, name: &str, count: usize) -> Result<(), DatabaseError> {
    let table = storage.get_table_schema(name)?;
    println!("{}", table.field_names().join(" | "));
    let mut scanner = storage.create_scanner(name, false)?;
    for row in scanner.scan_batch(count)? {
        let values: Vec<String> = row.to_text().into_iter().map(|(_, value)| value).collect();
        println!("{}", values.join(" | "));
    }
    Ok(())
}

fn show_blob(storage: &StorageManager, reference: BlobRef) -> Result<(), DatabaseError> {
    let bytes = storage.get_blob(reference.blob_page, reference.chunk, reference.length)?;
    println!("{} bytes", bytes.len());
    println!("{}", hex_dump(&bytes));
    Ok(())
}

fn process_command(storage: &StorageManager, command: &str) -> bool {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let result = match parts.as_slice() {
        [] => Ok(()),
        ["exit" | "quit" | "q"] => {
            println!("Goodbye!");
            return false;
        }
        ["help" | "h"] => {
            print_help();
            Ok(())
        }
        ["tables"] => {
            list_tables(storage);
            Ok(())
        }
        ["schema", name] => show_schema(storage, name),
        ["row", name, index] | ["row", name, index, _] => match index.parse() {
            Ok(index) => show_row(storage, name, index, parts.len() == 4),
            Err(_) => {
                println!("row index must be a number");
                Ok(())
            }
        },
        ["rows", name] => show_rows(storage, name, DEFAULT_ROWS),
        ["rows", name, count] => show_rows(storage, name, count.parse().unwrap_or(DEFAULT_ROWS)),
        ["blob", page, chunk, length] => {
            match BlobRef::parse(&format!("blob/{page}/{chunk}/{length}")) {
                Some(reference) => show_blob(storage, reference),
                None => {
                    println!("blob arguments must be numbers");
                    Ok(())
                }
            }
        }
        [reference] if reference.starts_with("blob/") => match BlobRef::parse(reference) {
            Some(reference) => show_blob(storage, reference),
            None => {
                println!("malformed blob reference");
                Ok(())
            }
        },
        _ => {
            println!("Unknown command, type 'help' for the list of commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        println!("Error: {err}");
    }
    true
}

fn main() -> rustyline::Result<()> {
    let args = Args::parse();

    let fmt_layer = tracing_subscriber::fmt::layer().compact();
    let filter_layer = filter::EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into());
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let path = database_path(args.base);
    let storage = match StorageManager::open(&path) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("Cannot open {}: {}", path.display(), err);
            std::process::exit(1);
        }
    };
    println!("{} tables in {}", storage.catalog().len(), path.display());

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("onecd> ") {
            Ok(line) => {
                let command = line.trim().to_string();
                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                }
                if !process_command(&storage, &command) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
