//! pricestore — daily OHLCV price file ingestion.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], host startup in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
