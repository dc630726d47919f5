//! Inline keyboard protocol: pagination and the detail toggle
//!
//! Buttons carry only a cursor (`"token:<page>"` / `"details:<level>"`);
//! the query they refer to — the anchor — lives in the user state store.
//! Rendered buttons outlive the process, so a click may arrive with no
//! stored anchor at all; in that case the anchor is recovered from the
//! text of the message the keyboard replied to, persisted, and the
//! transition continues as if it had never been missing.

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters,
};
use teloxide::{ApiError, RequestError};

use super::format::format_token;
use super::notifications::notify_handler_error;
use super::types::HandlerDeps;
use crate::core::AppResult;
use crate::dex::filter;
use crate::dex::types::TokenPair;
use crate::storage::store::{decode_anchor, encode_anchor};
use crate::storage::Table;

/// Callback-data prefix of pagination buttons
pub const PAGINATION_PREFIX: &str = "token";
/// Callback-data prefix of detail-toggle buttons
pub const DETAILS_PREFIX: &str = "details";

const REPEAT_QUERY_PROMPT: &str = "Please search again";
const STALE_CALLBACK_PROMPT: &str = "Run the command again";

/// Verbosity level of a pair rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    Less,
    More,
}

impl DetailLevel {
    pub fn toggled(self) -> Self {
        match self {
            DetailLevel::Less => DetailLevel::More,
            DetailLevel::More => DetailLevel::Less,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::Less => "less",
            DetailLevel::More => "more",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "less" => Some(DetailLevel::Less),
            "more" => Some(DetailLevel::More),
            _ => None,
        }
    }

    fn button_label(self) -> &'static str {
        match self {
            DetailLevel::Less => "Less Details",
            DetailLevel::More => "More Details",
        }
    }
}

/// A callback payload, decoded once at the dispatch boundary
///
/// `Pagination(None)` is not an error: a missing or unparsable cursor is
/// the signal for a first render (new message) rather than a page edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    Pagination(Option<u32>),
    DetailToggle(DetailLevel),
}

impl CallbackToken {
    pub fn encode(&self) -> String {
        match self {
            CallbackToken::Pagination(Some(page)) => format!("{}:{}", PAGINATION_PREFIX, page),
            CallbackToken::Pagination(None) => format!("{}:", PAGINATION_PREFIX),
            CallbackToken::DetailToggle(level) => format!("{}:{}", DETAILS_PREFIX, level.as_str()),
        }
    }

    /// Split on the last `:`; the prefix picks the kind, the remainder is
    /// interpreted as that kind's cursor type.
    pub fn decode(raw: &str) -> Option<Self> {
        let (kind, cursor) = raw.rsplit_once(':')?;
        match kind {
            PAGINATION_PREFIX => Some(CallbackToken::Pagination(cursor.parse().ok())),
            DETAILS_PREFIX => DetailLevel::parse(cursor).map(CallbackToken::DetailToggle),
            _ => None,
        }
    }
}

/// Where the resolved anchor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    Stored,
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub text: String,
    pub source: AnchorSource,
}

/// Resolve the search anchor: stored value first, then the reply parent.
///
/// Recovery drops the first whitespace-separated word of the parent text
/// (the command part) and keeps the remainder as the query. A parent that
/// cannot be split into command + argument yields `None` — the caller
/// prompts the user instead of guessing.
pub fn resolve_search_anchor(stored: Option<&str>, reply_parent_text: Option<&str>) -> Option<Anchor> {
    if let Some(text) = stored {
        return Some(Anchor {
            text: text.to_string(),
            source: AnchorSource::Stored,
        });
    }
    let parent = reply_parent_text?.trim();
    let (_, argument) = parent.split_once(|c: char| c.is_whitespace())?;
    let argument = argument.trim();
    if argument.is_empty() {
        return None;
    }
    Some(Anchor {
        text: argument.to_string(),
        source: AnchorSource::Recovered,
    })
}

/// Resolve the pair anchor (`"<chain> <address>"`).
///
/// Recovery expects the reply parent to be the original two-word lookup
/// message; anything else fails into the repeat-query prompt.
pub fn resolve_pair_anchor(stored: Option<&str>, reply_parent_text: Option<&str>) -> Option<Anchor> {
    if let Some(text) = stored {
        return Some(Anchor {
            text: text.to_string(),
            source: AnchorSource::Stored,
        });
    }
    let words: Vec<&str> = reply_parent_text?.split_whitespace().collect();
    if let [chain, address] = words[..] {
        return Some(Anchor {
            text: format!("{} {}", chain, address),
            source: AnchorSource::Recovered,
        });
    }
    None
}

/// Pagination controls: Previous iff not on page 1, Next iff more follow.
pub fn pagination_markup(current: u32, last: u32) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    if current > 1 {
        rows.push(vec![InlineKeyboardButton::callback(
            "Previous",
            CallbackToken::Pagination(Some(current - 1)).encode(),
        )]);
    }
    if current < last {
        rows.push(vec![InlineKeyboardButton::callback(
            "Next",
            CallbackToken::Pagination(Some(current + 1)).encode(),
        )]);
    }
    InlineKeyboardMarkup::new(rows)
}

/// Detail-toggle control: one button carrying the opposite level.
pub fn details_markup(current: DetailLevel) -> InlineKeyboardMarkup {
    let next = current.toggled();
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        next.button_label(),
        CallbackToken::DetailToggle(next).encode(),
    )]])
}

/// Whether a render replaces the clicked message or starts a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Send,
    Edit,
}

/// A render decision: text, controls, and how to deliver them
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub markup: InlineKeyboardMarkup,
    pub mode: RenderMode,
}

/// Render one page of a search result list (1-indexed).
///
/// Out of range — including an empty list — renders a not-found line with
/// the same (harmless) controls instead of failing.
pub fn render_page(anchor: &str, page: u32, pairs: &[TokenPair], fresh: bool) -> Rendered {
    let total = pairs.len() as u32;
    let text = if page >= 1 && page <= total {
        format!(
            "{} of {}\n\n{}",
            page,
            total,
            format_token(&pairs[(page - 1) as usize], false)
        )
    } else {
        format!("Page {} not found for {}", page, teloxide::utils::html::escape(anchor))
    };

    Rendered {
        text,
        markup: pagination_markup(page, total),
        mode: if fresh { RenderMode::Send } else { RenderMode::Edit },
    }
}

/// Render a single pair at the requested detail level. Always an edit:
/// the toggle is only reachable from an already-rendered lookup message.
pub fn render_details(pair: &TokenPair, level: DetailLevel) -> Rendered {
    Rendered {
        text: format_token(pair, level == DetailLevel::More),
        markup: details_markup(level),
        mode: RenderMode::Edit,
    }
}

/// Not-found rendering for the detail toggle. The anchor words may come
/// from recovered reply text, so they are escaped like any other
/// user-derived content; the control stays so a later click re-runs the
/// lookup.
pub fn render_pair_not_found(chain: &str, address: &str, level: DetailLevel) -> Rendered {
    Rendered {
        text: format!(
            "Token not found on {} at {}",
            teloxide::utils::html::escape(chain),
            teloxide::utils::html::escape(address)
        ),
        markup: details_markup(level),
        mode: RenderMode::Edit,
    }
}

/// One pagination transition, from either a fresh search or a button click
pub struct PageRequest {
    pub user_id: i64,
    pub chat_id: ChatId,
    /// Reply target (fresh render) or edit target (page click)
    pub message_id: MessageId,
    pub cursor: Option<u32>,
    pub reply_parent_text: Option<String>,
}

/// Drive a pagination transition: resolve the anchor, query the provider,
/// render, and deliver.
pub async fn run_pagination(bot: &Bot, deps: &HandlerDeps, req: PageRequest) -> AppResult<()> {
    let data = deps.store.get_user_data(req.user_id, Table::Users).await?;
    let stored = decode_anchor(&data, "query_search");

    let anchor = match resolve_search_anchor(stored.as_deref(), req.reply_parent_text.as_deref()) {
        Some(anchor) => anchor,
        None => {
            bot.send_message(req.chat_id, REPEAT_QUERY_PROMPT)
                .reply_parameters(ReplyParameters::new(req.message_id))
                .await?;
            return Ok(());
        }
    };

    if anchor.source == AnchorSource::Recovered {
        log::info!(
            "Recovered search anchor {:?} for user {} from reply context",
            anchor.text,
            req.user_id
        );
        let encoded = encode_anchor(&anchor.text)?;
        deps.store
            .set_user_data(req.user_id, Table::Users, &[("query_search", &encoded)])
            .await?;
    }

    let fresh = req.cursor.is_none();
    let page = req.cursor.unwrap_or(1);

    let query = filter::parse_query(&anchor.text);
    let pairs = match deps.dex.search_pairs(&query.text).await {
        Ok(pairs) => pairs,
        Err(err) => {
            log::error!("Provider search failed for {:?}: {}", query.text, err);
            notify_handler_error(bot, "Provider search failed", &err).await;
            Vec::new()
        }
    };
    let pairs = filter::apply(&query.filters, pairs);

    let rendered = render_page(&anchor.text, page, &pairs, fresh);
    apply_render(bot, req.chat_id, req.message_id, rendered).await
}

/// One detail-toggle transition
pub struct DetailsRequest {
    pub user_id: i64,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub level: DetailLevel,
    pub reply_parent_text: Option<String>,
}

/// Drive a detail toggle: resolve the pair anchor, re-query the single
/// pair, and re-render at the requested verbosity.
pub async fn run_details(bot: &Bot, deps: &HandlerDeps, req: DetailsRequest) -> AppResult<()> {
    let data = deps.store.get_user_data(req.user_id, Table::Users).await?;
    let stored = decode_anchor(&data, "query_pair");

    let anchor = match resolve_pair_anchor(stored.as_deref(), req.reply_parent_text.as_deref()) {
        Some(anchor) => anchor,
        None => {
            bot.send_message(req.chat_id, REPEAT_QUERY_PROMPT)
                .reply_parameters(ReplyParameters::new(req.message_id))
                .await?;
            return Ok(());
        }
    };

    // A stored anchor that does not split into chain + address is treated
    // the same as a failed recovery.
    let Some((chain, address)) = anchor.text.split_once(' ') else {
        bot.send_message(req.chat_id, REPEAT_QUERY_PROMPT)
            .reply_parameters(ReplyParameters::new(req.message_id))
            .await?;
        return Ok(());
    };

    if anchor.source == AnchorSource::Recovered {
        log::info!(
            "Recovered pair anchor {:?} for user {} from reply context",
            anchor.text,
            req.user_id
        );
        let encoded = encode_anchor(&anchor.text)?;
        deps.store
            .set_user_data(req.user_id, Table::Users, &[("query_pair", &encoded)])
            .await?;
    }

    let pair = match deps.dex.get_pair(chain, address).await {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("Provider lookup failed for {} {}: {}", chain, address, err);
            notify_handler_error(bot, "Provider lookup failed", &err).await;
            None
        }
    };

    let rendered = match pair {
        Some(pair) => render_details(&pair, req.level),
        None => render_pair_not_found(chain, address, req.level),
    };
    apply_render(bot, req.chat_id, req.message_id, rendered).await
}

/// Pagination button click
pub async fn handle_pagination_callback(
    bot: &Bot,
    q: &CallbackQuery,
    deps: &HandlerDeps,
    cursor: Option<u32>,
) -> AppResult<()> {
    if !acknowledge(bot, q).await? {
        return Ok(());
    }
    let Some(msg) = q.message.as_ref() else {
        return Ok(());
    };

    let reply_parent_text = msg
        .regular_message()
        .and_then(|m| m.reply_to_message())
        .and_then(|parent| parent.text())
        .map(String::from);

    run_pagination(
        bot,
        deps,
        PageRequest {
            user_id: callback_user_id(q),
            chat_id: msg.chat().id,
            message_id: msg.id(),
            cursor,
            reply_parent_text,
        },
    )
    .await
}

/// Detail-toggle button click
pub async fn handle_details_callback(
    bot: &Bot,
    q: &CallbackQuery,
    deps: &HandlerDeps,
    level: DetailLevel,
) -> AppResult<()> {
    if !acknowledge(bot, q).await? {
        return Ok(());
    }
    let Some(msg) = q.message.as_ref() else {
        return Ok(());
    };

    let reply_parent_text = msg
        .regular_message()
        .and_then(|m| m.reply_to_message())
        .and_then(|parent| parent.text())
        .map(String::from);

    run_details(
        bot,
        deps,
        DetailsRequest {
            user_id: callback_user_id(q),
            chat_id: msg.chat().id,
            message_id: msg.id(),
            level,
            reply_parent_text,
        },
    )
    .await
}

/// Acknowledge the callback before any recovery/query work.
///
/// Returns `false` when the handle has expired — the click is then
/// answered with a repeat prompt and the transition aborted. Transport
/// errors still propagate.
async fn acknowledge(bot: &Bot, q: &CallbackQuery) -> AppResult<bool> {
    match bot.answer_callback_query(q.id.clone()).await {
        Ok(_) => Ok(true),
        Err(RequestError::Api(api_err)) => {
            log::warn!("Stale callback from user {}: {}", q.from.id, api_err);
            if let Some(msg) = q.message.as_ref() {
                if let Err(err) = bot
                    .send_message(msg.chat().id, STALE_CALLBACK_PROMPT)
                    .reply_parameters(ReplyParameters::new(msg.id()))
                    .await
                {
                    log::error!("Failed to send stale-callback prompt: {}", err);
                }
            }
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

fn callback_user_id(q: &CallbackQuery) -> i64 {
    i64::try_from(q.from.id.0).unwrap_or(0)
}

async fn apply_render(bot: &Bot, chat_id: ChatId, message_id: MessageId, rendered: Rendered) -> AppResult<()> {
    match rendered.mode {
        RenderMode::Send => {
            bot.send_message(chat_id, rendered.text)
                .parse_mode(ParseMode::Html)
                .reply_markup(rendered.markup)
                .reply_parameters(ReplyParameters::new(message_id))
                .await?;
        }
        RenderMode::Edit => {
            let edit = bot
                .edit_message_text(chat_id, message_id, rendered.text)
                .parse_mode(ParseMode::Html)
                .reply_markup(rendered.markup)
                .await;
            if let Err(err) = edit {
                // Re-clicking a dead-end page re-renders identical content,
                // which Telegram rejects as an unmodified edit. Only that
                // rejection is non-fatal.
                match err {
                    RequestError::Api(ApiError::MessageNotModified) => {
                        log::warn!("Edit of unchanged message dropped");
                    }
                    other => return Err(other.into()),
                }
            }
        }
    }
    Ok(())
}
