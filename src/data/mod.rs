//! Tabular data loading for the CLI.

mod csv;

pub use csv::{read_arm_value_columns, read_value_column, DataError};
