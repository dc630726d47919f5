//! Message routing: slash commands and plain-text queries
//!
//! Plain text is routed by shape: a `/filter` suffix or a single word is a
//! search, exactly two words is a direct `<chain> <address>` lookup, and
//! anything else earns a hint at /help.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};

use super::bot::Command;
use super::format::format_token;
use super::keyboards::{self, DetailLevel, PageRequest};
use super::notifications::notify_handler_error;
use super::types::{HandlerDeps, HandlerError};
use crate::dex::filter;
use crate::storage::store::encode_anchor;
use crate::storage::Table;

const START_TEXT: &str = "Hello! Send me a token name or address to search DexScreener, or \
<code>&lt;chain&gt; &lt;address&gt;</code> to look up a specific pair. See /help for details.";

const HELP_TEXT: &str = "Send a token name, symbol, or address and I will search DexScreener \
for matching pairs. Page through the results with the buttons under the reply.\n\n\
Send <code>&lt;chain&gt; &lt;address&gt;</code> (for example \
<code>ethereum 0x88e6...5640</code>) to look up one pair directly; use the \
button under the reply to toggle the detail level.\n\n\
Narrow a search with a filter suffix: \
<code>WBTC /filter chain=ethereum,dex=uniswap</code>.";

const ABOUT_TEXT: &str = "I proxy the public DexScreener API: pair prices, liquidity, volume, \
and transaction stats, straight to your chat.";

const HINT_TEXT: &str = "I did not understand that. See /help for what I can do.";

/// How a plain-text message should be handled
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Search(&'a str),
    PairLookup { chain: &'a str, address: &'a str },
    Hint,
}

/// Classify a plain-text message by its shape.
pub fn route_text(text: &str) -> Route<'_> {
    let text = text.trim();
    if filter::has_filter_suffix(text) {
        return Route::Search(text);
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    match words[..] {
        [_single] => Route::Search(text),
        [chain, address] => Route::PairLookup { chain, address },
        _ => Route::Hint,
    }
}

/// Slash-command endpoint
pub async fn command_handler(bot: Bot, msg: Message, cmd: Command) -> Result<(), HandlerError> {
    let text = match cmd {
        Command::Start => START_TEXT,
        Command::Help => HELP_TEXT,
        Command::About => ABOUT_TEXT,
    };
    bot.send_message(msg.chat.id, text).parse_mode(ParseMode::Html).await?;
    Ok(())
}

/// Plain-text endpoint
pub async fn message_handler(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = i64::try_from(user.id.0).unwrap_or(0);

    match route_text(text) {
        Route::Search(query) => search(&bot, &deps, &msg, user_id, query).await?,
        Route::PairLookup { chain, address } => {
            lookup_pair(&bot, &deps, &msg, user_id, chain, address).await?
        }
        Route::Hint => {
            bot.send_message(msg.chat.id, HINT_TEXT)
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
    }
    Ok(())
}

/// Persist the search anchor, then render page 1 as a fresh reply.
async fn search(
    bot: &Bot,
    deps: &HandlerDeps,
    msg: &Message,
    user_id: i64,
    query: &str,
) -> Result<(), HandlerError> {
    let encoded = encode_anchor(query)?;
    deps.store
        .set_user_data(user_id, Table::Users, &[("query_search", &encoded)])
        .await?;

    keyboards::run_pagination(
        bot,
        deps,
        PageRequest {
            user_id,
            chat_id: msg.chat.id,
            message_id: msg.id,
            cursor: None,
            reply_parent_text: None,
        },
    )
    .await?;
    Ok(())
}

/// Direct pair lookup; the anchor is persisted only when the pair exists.
async fn lookup_pair(
    bot: &Bot,
    deps: &HandlerDeps,
    msg: &Message,
    user_id: i64,
    chain: &str,
    address: &str,
) -> Result<(), HandlerError> {
    let pair = match deps.dex.get_pair(chain, address).await {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("Provider lookup failed for {} {}: {}", chain, address, err);
            notify_handler_error(bot, "Provider lookup failed", &err).await;
            None
        }
    };

    match pair {
        Some(pair) => {
            let anchor = format!("{} {}", chain, address);
            let encoded = encode_anchor(&anchor)?;
            deps.store
                .set_user_data(user_id, Table::Users, &[("query_pair", &encoded)])
                .await?;

            bot.send_message(msg.chat.id, format_token(&pair, false))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::details_markup(DetailLevel::Less))
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, format!("Token not found on {} at {}", chain, address))
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_word_is_a_search() {
        assert_eq!(route_text("WBTC"), Route::Search("WBTC"));
        assert_eq!(route_text("  WBTC/USDC  "), Route::Search("WBTC/USDC"));
    }

    #[test]
    fn test_two_words_are_a_pair_lookup() {
        assert_eq!(
            route_text("ethereum 0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"),
            Route::PairLookup {
                chain: "ethereum",
                address: "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
            }
        );
    }

    #[test]
    fn test_filter_suffix_forces_a_search() {
        assert_eq!(
            route_text("WBTC USDC /filter chain=ethereum"),
            Route::Search("WBTC USDC /filter chain=ethereum")
        );
    }

    #[test]
    fn test_marker_embedded_in_an_address_stays_a_lookup() {
        assert_eq!(
            route_text("chain abc/filtered"),
            Route::PairLookup {
                chain: "chain",
                address: "abc/filtered"
            }
        );
    }

    #[test]
    fn test_anything_else_is_a_hint() {
        assert_eq!(route_text("what is the price of bitcoin"), Route::Hint);
        assert_eq!(route_text(""), Route::Hint);
        assert_eq!(route_text("   "), Route::Hint);
    }
}
