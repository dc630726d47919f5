//! Bot initialization and command menu

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "get help about this bot")]
    Help,
    #[command(description = "get information about the bot")]
    About,
}

/// Creates a Bot instance with a timeout-configured HTTP client
///
/// The token is read from `TELOXIDE_TOKEN`.
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::from_env_with_client(client))
}

/// Registers the command menu in the Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "start the bot"),
        BotCommand::new("help", "get help about this bot"),
        BotCommand::new("about", "get information about the bot"),
    ])
    .await?;

    Ok(())
}
