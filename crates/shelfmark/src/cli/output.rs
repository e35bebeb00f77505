//! Output formatting utilities for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use shelfmark::catalog::types::{ID_FIELD, NAME_FIELD, PATH_FIELD};
use shelfmark::{FieldValue, Record, Schema};

/// Join the values of a field for display.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Single(v) => v.clone(),
        FieldValue::List(values) => values.join(", "),
    }
}

/// Print a table with headers
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    println!("{table}");
}

/// Columns shown for records: ID, Name, Path, then the secondary fields.
pub fn record_columns(schema: &Schema) -> Vec<&str> {
    let mut columns = vec![ID_FIELD, NAME_FIELD, PATH_FIELD];
    for field in schema.secondary_fields() {
        if !columns.contains(&field.as_str()) {
            columns.push(field);
        }
    }
    columns
}

pub fn record_row(record: &Record, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|field| record.get(field).map(format_value).unwrap_or_default())
        .collect()
}

pub fn print_records<'a>(schema: &Schema, records: impl IntoIterator<Item = &'a Record>) {
    let columns = record_columns(schema);
    let rows = records
        .into_iter()
        .map(|record| record_row(record, &columns))
        .collect();
    print_table(&columns, rows);
}
