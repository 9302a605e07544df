//! Telegram front-end
//!
//! Commands: /start /about /get_quantity_pools /get_info_by_pool
//! /top10_pools /show_watchlist. Inline buttons add pools to the
//! caller's watchlist or show pool details. Watchlists are keyed by the
//! sender's Telegram user id; replies go to the chat the command or button
//! came from.

pub mod bot;
pub mod commands;
pub mod formatters;
pub mod keyboards;
pub mod state;

pub use bot::run;
pub use commands::Command;
pub use state::{BotContext, PendingPrompts};
