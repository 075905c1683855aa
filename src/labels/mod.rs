//! Label replacement for the coded accidents table
//!
//! Replaces categorical codes with the labels from the road-safety lookup
//! table, derives a timestamp from the date and time columns, drops exact
//! duplicate rows and writes a cleaned CSV.

mod cleaner;
mod lookup;
mod timestamp;

pub use cleaner::{
    add_timestamp, apply_labels, clean_accidents, drop_duplicates, write_csv, CleanSummary,
};
pub use lookup::{LabelMap, LookupTable};
pub use timestamp::parse_mixed_datetime;
