//! Province → city → wall-detail lookup over an irregular spreadsheet.
//!
//! The workbook is loaded once into text grids ([`sheet`]), the lookup heuristics
//! ([`lookup`]) infer column roles and join the three sheets by code/name
//! containment, and [`cli`] / [`server`] expose the pipeline.

pub mod cli;
pub mod config;
pub mod error;
pub mod lookup;
pub mod server;
pub mod sheet;

pub use error::LookupError;
