//! Shared state handed to every handler

use crate::apis::StonfiClient;
use crate::database::WatchlistStore;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Chats that were asked for a pool address and have not answered yet
#[derive(Debug, Default)]
pub struct PendingPrompts {
    chats: Mutex<HashSet<i64>>,
}

impl PendingPrompts {
    pub fn begin(&self, chat_id: i64) {
        self.chats.lock().insert(chat_id);
    }

    /// Consume the prompt; `true` if one was open
    pub fn take(&self, chat_id: i64) -> bool {
        self.chats.lock().remove(&chat_id)
    }

    pub fn is_pending(&self, chat_id: i64) -> bool {
        self.chats.lock().contains(&chat_id)
    }
}

pub struct BotContext {
    pub client: Arc<StonfiClient>,
    pub watchlist: Arc<WatchlistStore>,
    pub pending: PendingPrompts,
    pub about_text: String,
    pub top_pools_limit: usize,
}

impl BotContext {
    pub fn new(
        client: Arc<StonfiClient>,
        watchlist: Arc<WatchlistStore>,
        about_text: impl Into<String>,
        top_pools_limit: usize,
    ) -> Self {
        Self {
            client,
            watchlist,
            pending: PendingPrompts::default(),
            about_text: about_text.into(),
            top_pools_limit,
        }
    }
}
