//! CSV decoding module
//!
//! Turns delimited source files into Arrow RecordBatches.
//!
//! # Overview
//!
//! - [`CsvSource`] infers a [`MasterSchema`] from the head of a file and then
//!   streams the whole file as all-text batches
//! - [`coerce_batch`] converts a text batch to the master schema's types,
//!   turning unparseable values into nulls

mod coerce;
mod csv;
mod schema;

pub use coerce::{coerce_batch, parse_float, parse_integer};
pub use csv::{CsvSource, TextBatches};
pub use schema::{ColumnKind, MasterSchema};

#[cfg(test)]
mod tests;
