//! Inline keyboards and callback data
//!
//! Callback payloads are `add_watchlist_<address>` and `get_info_<address>`.
//! Telegram caps callback data at 64 bytes; a TON address is 48.

use crate::apis::stonfi::Pool;
use crate::database::WatchlistEntry;
use crate::reports::short_address;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const ADD_WATCHLIST_PREFIX: &str = "add_watchlist_";
pub const GET_INFO_PREFIX: &str = "get_info_";

/// Telegram limit on `callback_data`
pub const MAX_CALLBACK_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    AddWatchlist(String),
    GetInfo(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(address) = data.strip_prefix(ADD_WATCHLIST_PREFIX) {
            return non_empty(address).map(CallbackAction::AddWatchlist);
        }
        if let Some(address) = data.strip_prefix(GET_INFO_PREFIX) {
            return non_empty(address).map(CallbackAction::GetInfo);
        }
        None
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::AddWatchlist(address) => format!("{}{}", ADD_WATCHLIST_PREFIX, address),
            CallbackAction::GetInfo(address) => format!("{}{}", GET_INFO_PREFIX, address),
        }
    }
}

fn non_empty(address: &str) -> Option<String> {
    let address = address.trim();
    (!address.is_empty()).then(|| address.to_string())
}

fn btn(text: &str, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), action.to_data())
}

/// Shown under a pool info reply
pub fn pool_actions(pool_address: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        btn(
            "⭐ Add to watchlist",
            CallbackAction::AddWatchlist(pool_address.to_string()),
        ),
        btn("🔄 Refresh", CallbackAction::GetInfo(pool_address.to_string())),
    ]])
}

/// One row per watched pool
pub fn watchlist(entries: &[WatchlistEntry]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        entries
            .iter()
            .map(|entry| {
                vec![btn(
                    &entry.pool_name,
                    CallbackAction::GetInfo(entry.pool_address.clone()),
                )]
            })
            .collect::<Vec<_>>(),
    )
}

pub fn top_pools(pools: &[Pool]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        pools
            .iter()
            .enumerate()
            .map(|(i, pool)| {
                vec![btn(
                    &format!("{}. {}", i + 1, short_address(&pool.address)),
                    CallbackAction::GetInfo(pool.address.clone()),
                )]
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs";

    #[test]
    fn test_parse_round_trip() {
        let add = CallbackAction::AddWatchlist(ADDRESS.to_string());
        assert_eq!(CallbackAction::parse(&add.to_data()), Some(add));
        assert_eq!(
            CallbackAction::parse(&format!("get_info_{}", ADDRESS)),
            Some(CallbackAction::GetInfo(ADDRESS.to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_or_empty() {
        assert_eq!(CallbackAction::parse("get_info_"), None);
        assert_eq!(CallbackAction::parse("menu:main"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn test_callback_data_fits_telegram_limit() {
        let longest = CallbackAction::AddWatchlist(ADDRESS.to_string()).to_data();
        assert!(longest.len() <= MAX_CALLBACK_BYTES);
    }

    #[test]
    fn test_watchlist_keyboard_rows() {
        let entries = vec![
            WatchlistEntry {
                id: 1,
                user_id: 9,
                pool_address: "EQa".into(),
                pool_name: "TON/USDT".into(),
            },
            WatchlistEntry {
                id: 2,
                user_id: 9,
                pool_address: "EQb".into(),
                pool_name: "STON/TON".into(),
            },
        ];
        let markup = watchlist(&entries);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "STON/TON");
    }
}
