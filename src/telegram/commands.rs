//! Command, text and callback handlers
//!
//! Handlers never fail on application errors: those are logged and turned
//! into a short reply. Only Telegram request failures propagate to the
//! dispatcher.

use super::formatters;
use super::keyboards::{self, CallbackAction};
use super::state::BotContext;
use crate::database::PoolRecord;
use crate::errors::BotError;
use crate::logger::{self, LogTag};
use crate::reports::{self, PoolReport};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "about this bot")]
    About,
    #[command(rename = "get_quantity_pools", description = "number of stored pools")]
    GetQuantityPools,
    #[command(rename = "get_info_by_pool", description = "pool details by address")]
    GetInfoByPool,
    #[command(rename = "top10_pools", description = "largest pools by liquidity")]
    Top10Pools,
    #[command(rename = "show_watchlist", description = "your watchlist")]
    ShowWatchlist,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    logger::debug(
        LogTag::Telegram,
        &format!("Command {:?} from chat {}", cmd, chat_id.0),
    );

    match cmd {
        Command::Start => {
            send_html(&bot, chat_id, &formatters::welcome_message(), None).await?;
        }
        Command::About => {
            send_html(&bot, chat_id, &formatters::html_escape(&ctx.about_text), None).await?;
        }
        Command::GetQuantityPools => match ctx.watchlist.count_pools() {
            Ok(count) => {
                send_html(&bot, chat_id, &formatters::format_pool_count(count), None).await?;
            }
            Err(e) => report_error(&bot, chat_id, BotError::from(e)).await?,
        },
        Command::GetInfoByPool => {
            ctx.pending.begin(chat_id.0);
            bot.send_message(chat_id, "Send me the pool address.")
                .await?;
        }
        Command::Top10Pools => {
            match reports::top_pools(ctx.client.as_ref(), ctx.top_pools_limit).await {
                Ok(pools) => {
                    let keyboard = (!pools.is_empty()).then(|| keyboards::top_pools(&pools));
                    send_html(&bot, chat_id, &formatters::format_top_pools(&pools), keyboard)
                        .await?;
                }
                Err(e) => report_error(&bot, chat_id, BotError::from(e)).await?,
            }
        }
        Command::ShowWatchlist => {
            let Some(user_id) = sender_id(&msg) else {
                bot.send_message(chat_id, "Cannot tell who sent this command.")
                    .await?;
                return Ok(());
            };
            match ctx.watchlist.list_watchlist(user_id) {
                Ok(entries) => {
                    let keyboard = (!entries.is_empty()).then(|| keyboards::watchlist(&entries));
                    send_html(&bot, chat_id, &formatters::format_watchlist(&entries), keyboard)
                        .await?;
                }
                Err(e) => report_error(&bot, chat_id, BotError::from(e)).await?,
            }
        }
    }
    Ok(())
}

/// Plain text: a pool address if one was asked for, otherwise a hint
pub async fn handle_text(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let text = msg.text().map(str::trim).unwrap_or_default();

    if text.is_empty() || !ctx.pending.take(chat_id.0) {
        bot.send_message(chat_id, "Use /get_info_by_pool to look up a pool.")
            .await?;
        return Ok(());
    }

    send_pool_info(&bot, chat_id, &ctx, text).await
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let user_id = q.from.id.0 as i64;
    let chat_id = reply_chat(&q);

    // Telegram expects the answer within seconds, before any API lookup
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        logger::warning(
            LogTag::Telegram,
            &format!("Unknown callback data: {:?}", q.data),
        );
        return Ok(());
    };

    match action {
        CallbackAction::GetInfo(address) => {
            send_pool_info(&bot, chat_id, &ctx, &address).await?;
        }
        CallbackAction::AddWatchlist(address) => {
            match add_to_watchlist(&ctx, user_id, &address).await {
                Ok(added) => {
                    bot.send_message(chat_id, watchlist_add_reply(added)).await?;
                }
                Err(e) => report_error(&bot, chat_id, e).await?,
            }
        }
    }
    Ok(())
}

/// Watchlists belong to the Telegram user, whatever chat the command came from
fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().map(|user| user.id.0 as i64)
}

/// The chat holding the tapped keyboard; the user's private chat only when
/// the message is unavailable
fn reply_chat(q: &CallbackQuery) -> ChatId {
    q.message
        .as_ref()
        .map(|message| message.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64))
}

fn watchlist_add_reply(added: bool) -> &'static str {
    if added {
        "⭐ Added to your watchlist"
    } else {
        "Already in your watchlist"
    }
}

/// Make sure the pool row exists, then add the watchlist entry
async fn add_to_watchlist(ctx: &BotContext, user_id: i64, address: &str) -> Result<bool, BotError> {
    if ctx.watchlist.find_pool(address)?.is_none() {
        let report = PoolReport::fetch(ctx.client.as_ref(), address).await?;
        ctx.watchlist.upsert_pool(&PoolRecord::from_report(&report))?;
    }
    Ok(ctx.watchlist.add_to_watchlist(user_id, address)?)
}

async fn send_pool_info(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    address: &str,
) -> ResponseResult<()> {
    match PoolReport::fetch(ctx.client.as_ref(), address).await {
        Ok(report) => {
            if let Err(e) = ctx.watchlist.upsert_pool(&PoolRecord::from_report(&report)) {
                logger::warning(
                    LogTag::Database,
                    &format!("Failed to store pool {}: {}", report.pool.address, e),
                );
            }
            send_html(
                bot,
                chat_id,
                &formatters::format_pool_info(&report),
                Some(keyboards::pool_actions(&report.pool.address)),
            )
            .await
        }
        Err(e) => report_error(bot, chat_id, e).await,
    }
}

async fn send_html(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let request = bot
        .send_message(chat_id, text.to_string())
        .parse_mode(ParseMode::Html);
    match keyboard {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

async fn report_error(bot: &Bot, chat_id: ChatId, error: BotError) -> ResponseResult<()> {
    logger::warning(
        LogTag::Telegram,
        &format!("Request from chat {} failed: {}", chat_id.0, error),
    );
    bot.send_message(chat_id, format!("⚠️ {}", error.user_message()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let parse = |text: &str| Command::parse(text, "pools_alerter_bot").ok();
        assert_eq!(parse("/start"), Some(Command::Start));
        assert_eq!(parse("/get_quantity_pools"), Some(Command::GetQuantityPools));
        assert_eq!(parse("/get_info_by_pool"), Some(Command::GetInfoByPool));
        assert_eq!(parse("/top10_pools"), Some(Command::Top10Pools));
        assert_eq!(parse("/show_watchlist@pools_alerter_bot"), Some(Command::ShowWatchlist));
        assert_eq!(parse("/unknown"), None);
    }

    fn group_message(text: &str) -> serde_json::Value {
        serde_json::json!({
            "message_id": 7,
            "date": 1700000000,
            "chat": { "id": -100123, "type": "group", "title": "Pools" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "text": text
        })
    }

    #[test]
    fn test_group_command_uses_sender_id() {
        let msg: Message = serde_json::from_value(group_message("/show_watchlist")).unwrap();
        assert_eq!(msg.chat.id, ChatId(-100123));
        assert_eq!(sender_id(&msg), Some(42));
    }

    #[test]
    fn test_callback_replies_in_originating_chat() {
        let q: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "cb1",
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "chat_instance": "ci",
            "data": "add_watchlist_EQpool",
            "message": group_message("Top pools")
        }))
        .unwrap();
        assert_eq!(reply_chat(&q), ChatId(-100123));
        assert_eq!(q.from.id.0, 42);

        let detached: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "cb2",
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "chat_instance": "ci",
            "data": "get_info_EQpool"
        }))
        .unwrap();
        assert_eq!(reply_chat(&detached), ChatId(42));
    }

    #[test]
    fn test_watchlist_add_reply() {
        assert_eq!(watchlist_add_reply(true), "⭐ Added to your watchlist");
        assert_eq!(watchlist_add_reply(false), "Already in your watchlist");
    }
}
