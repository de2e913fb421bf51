//! Report generation
//!
//! Renders aggregated activity as console text and CSV files, one report per
//! reporting window.

mod console;
mod csv;

pub use console::generate as generate_console;
pub use csv::generate as generate_csv;
