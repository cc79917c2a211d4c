//! Core domain types and logic.

pub mod config;
pub mod error;
pub mod indicator;
pub mod metrics_row;
pub mod ohlcv;
pub mod registry;
pub mod scheduler;
pub mod updater;
