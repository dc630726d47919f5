//! Developer-chat error forwarding
//!
//! Best effort only: a failure to deliver a report is logged and dropped,
//! never propagated into the handler that triggered it.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::html::escape;

use crate::core::config;

/// Send an HTML message to every configured developer chat
pub async fn notify_developers(bot: &Bot, text: &str) {
    for chat_id in config::DEVELOPER_CHAT_IDS.iter() {
        if let Err(err) = bot
            .send_message(ChatId(*chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
        {
            log::error!("Failed to notify developer chat {}: {}", chat_id, err);
        }
    }
}

/// Forward a handler failure to the developer chats
pub async fn notify_handler_error(bot: &Bot, context: &str, err: &(dyn std::fmt::Display + Sync)) {
    let text = format!("<b>{}</b>\n<pre>{}</pre>", escape(context), escape(&err.to_string()));
    notify_developers(bot, &text).await;
}
