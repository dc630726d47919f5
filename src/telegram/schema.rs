//! dptree update-handler tree

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use super::bot::Command;
use super::commands;
use super::keyboards::{self, CallbackToken};
use super::types::{HandlerDeps, HandlerError};

/// Build the dispatcher schema: commands, then plain text, then callbacks.
pub fn schema() -> UpdateHandler<HandlerError> {
    let message_branch = Update::filter_message()
        .branch(teloxide::filter_command::<Command, _>().endpoint(commands::command_handler))
        .branch(
            dptree::filter(|msg: Message| {
                msg.text().map(|text| !text.starts_with('/')).unwrap_or(false)
            })
            .endpoint(commands::message_handler),
        );

    let callback_branch = Update::filter_callback_query().endpoint(callback_handler);

    dptree::entry().branch(message_branch).branch(callback_branch)
}

/// Decode the callback payload once and dispatch on the token kind.
async fn callback_handler(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(raw) = q.data.as_deref() else {
        return Ok(());
    };
    match CallbackToken::decode(raw) {
        Some(CallbackToken::Pagination(cursor)) => {
            keyboards::handle_pagination_callback(&bot, &q, &deps, cursor).await?;
        }
        Some(CallbackToken::DetailToggle(level)) => {
            keyboards::handle_details_callback(&bot, &q, &deps, level).await?;
        }
        None => {
            log::warn!("Unrecognized callback payload: {:?}", raw);
        }
    }
    Ok(())
}
