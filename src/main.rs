use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use college_companion::bot::{self, AppState};
use college_companion::config::BotConfig;
use college_companion::localization::init_localization;
use college_companion::session::SessionState;
use college_companion::together::TogetherClient;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // LOG_FORMAT=json switches to one JSON object per line
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting College Companion bot");

    init_localization()?;
    let config = BotConfig::from_env()?;

    std::fs::create_dir_all(&config.upload_folder).with_context(|| {
        format!("Failed to create upload folder {}", config.upload_folder.display())
    })?;
    info!(upload_folder = %config.upload_folder.display(), model = %config.generation.model, "Configuration loaded");

    let generator = Arc::new(TogetherClient::new(
        config.together_api_key.clone(),
        config.generation.clone(),
    )?);
    let state = Arc::new(AppState::new(&config, generator));

    let bot = Bot::new(config.telegram_token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<SessionState>, SessionState>()
                .endpoint(bot::message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<SessionState>, SessionState>()
                .endpoint(bot::callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<SessionState>::new(), state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
