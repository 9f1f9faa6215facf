//! Session and cumulative camera usage reports.
//!
//! Rows are derived from the tracker's participant mapping, then rendered as
//! console tables or exported as CSV.

pub mod console;
pub mod export;
pub mod rows;

pub use console::{render_cumulative_table, render_session_table};
pub use export::{file_names, write_csv, CsvRow};
pub use rows::{CumulativeRow, HistoryRow, ReportBuilder, SessionRow};
