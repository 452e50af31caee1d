//! Serializers handed session data by the results screen.

mod csv_export;
mod table;

pub use csv_export::{CSV_HEADER, questions_to_csv, write_csv_file};
pub use table::{TableRow, render_table, table_rows};
