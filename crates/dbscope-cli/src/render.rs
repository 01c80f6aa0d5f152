//! Table rendering for terminal output

use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use dbscope_core::{Database, Row, SchemaObject};
use dbscope_sqlite::DatabaseFileInfo;
use std::path::Path;

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

fn modified_at(path: &Path) -> String {
    path.metadata()
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| "-".to_string())
}

pub fn databases_table(databases: &[Database]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["Name", "Size", "Modified"]);
    for database in databases {
        table.add_row(vec![
            Cell::new(&database.name),
            Cell::new(human_size(database.size_bytes)),
            Cell::new(modified_at(&database.path)),
        ]);
    }
    table
}

pub fn objects_table(objects: &[SchemaObject]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["Name", "Kind"]);
    for object in objects {
        table.add_row(vec![
            Cell::new(&object.name),
            Cell::new(object.kind.to_string()),
        ]);
    }
    table
}

pub fn rows_table(headers: &[String], rows: &[Row]) -> Table {
    let mut table = base_table();
    table.set_header(headers.iter().map(Cell::new).collect::<Vec<_>>());
    for row in rows {
        table.add_row(
            row.values
                .iter()
                .map(|value| Cell::new(value.to_string()))
                .collect::<Vec<_>>(),
        );
    }
    table
}

pub fn pragma_table(tab: &dbscope_browse::PragmaTab) -> Table {
    let mut table = base_table();
    table.set_header(tab.headers.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    for row in &tab.rows {
        table.add_row(
            row.values
                .iter()
                .map(|value| Cell::new(value.to_string()))
                .collect::<Vec<_>>(),
        );
    }
    table
}

pub fn info_table(path: &Path, details: &DatabaseFileInfo) -> Table {
    let mut table = base_table();
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["path", &path.display().to_string()]);
    table.add_row(vec![
        "size",
        &human_size(details.file_size_bytes.max(0) as u64),
    ]);
    table.add_row(vec!["page count", &details.page_count.to_string()]);
    table.add_row(vec!["page size", &details.page_size.to_string()]);
    table.add_row(vec!["encoding", &details.encoding]);
    table.add_row(vec!["journal mode", &details.journal_mode]);
    table.add_row(vec![
        "foreign keys",
        if details.foreign_keys_enabled { "on" } else { "off" },
    ]);
    table.add_row(vec!["modified", &modified_at(path)]);
    table
}
