//! Bot lifecycle: validate the token, register commands, dispatch until Ctrl+C

use super::commands::{self, Command};
use super::state::BotContext;
use crate::errors::BotError;
use crate::logger::{self, LogTag};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub async fn run(token: &str, ctx: Arc<BotContext>) -> Result<(), BotError> {
    if token.trim().is_empty() {
        return Err(BotError::MissingToken);
    }

    let bot = Bot::new(token.trim());
    let me = bot
        .get_me()
        .await
        .map_err(|e| BotError::Telegram(format!("invalid bot token: {}", e)))?;
    logger::info(
        LogTag::Telegram,
        &format!(
            "Bot initialized: @{} (ID: {})",
            me.username.as_deref().unwrap_or("unknown"),
            me.id
        ),
    );

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        logger::warning(
            LogTag::Telegram,
            &format!("Failed to register command list: {}", e),
        );
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(commands::handle_command),
                )
                .branch(dptree::endpoint(commands::handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(commands::handle_callback));

    logger::info(LogTag::Telegram, "Polling for updates (Ctrl+C to stop)");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    logger::info(LogTag::Telegram, "Dispatcher stopped");
    Ok(())
}
