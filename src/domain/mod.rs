//! Core domain types and logic.

pub mod dataset;
pub mod error;
pub mod loader;
pub mod materializer;
pub mod price_record;
pub mod row_parser;
