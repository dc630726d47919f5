use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::update_listeners::Polling;
use tokio::net::TcpListener;

use pairscope::core::{config, init_logger};
use pairscope::dex::DexClient;
use pairscope::storage::{create_pool, UserStore};
use pairscope::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    log::info!("Starting bot...");

    // Create database connection pool and the user state store
    let db_pool = create_pool(&config::DATABASE_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    let store = Arc::new(UserStore::new(db_pool)?);
    let dex = Arc::new(DexClient::new()?);

    // Create bot instance
    let bot = create_bot()?;

    let bot_info = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    // Register the command menu in the Telegram UI
    setup_bot_commands(&bot).await?;

    let deps = HandlerDeps::new(store, dex);

    match config::WEBHOOK_URL.clone() {
        Some(url) => run_webhook(bot, deps, &url).await,
        None => run_polling(bot, deps).await,
    }
}

/// Long polling mode (default)
async fn run_polling(bot: Bot, deps: HandlerDeps) -> Result<()> {
    log::info!("Starting bot in long polling mode");

    // Drop updates accumulated while the bot was down
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Webhook mode: teloxide's axum listener plus a /health route on the
/// same router.
async fn run_webhook(bot: Bot, deps: HandlerDeps, url: &str) -> Result<()> {
    log::info!("Starting bot in webhook mode at {}", url);

    let addr: std::net::SocketAddr = format!("{}:{}", *config::HOST, *config::PORT).parse()?;
    let mut options = webhooks::Options::new(addr, url::Url::parse(url)?);
    if let Some(secret) = config::WEBHOOK_SECRET.clone() {
        options = options.secret_token(secret);
    }

    let (listener, stop_flag, router) = webhooks::axum_to_router(bot.clone(), options).await?;
    let router = router.route("/health", axum::routing::get(|| async { "OK" }));

    let tcp = TcpListener::bind(addr).await?;
    log::info!("Webhook server listening on {}", addr);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(tcp, router).with_graceful_shutdown(stop_flag).await {
            log::error!("Webhook server error: {}", err);
        }
    });

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
