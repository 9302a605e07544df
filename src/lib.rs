//! pools-alerter: STON.fi pool tracker
//!
//! A typed client for the STON.fi REST API, pool metrics, a SQLite
//! watchlist and operations archive, and a Telegram front-end on top.

pub mod apis;
pub mod arguments;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod metrics;
pub mod reports;

#[cfg(feature = "telegram")]
pub mod telegram;
