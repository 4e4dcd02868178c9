use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_bot::client::ApiClient;
use blog_bot::handlers::{self, BotState};
use blog_bot::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blog_bot=info,teloxide=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BotConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    info!(api = %config.api_base_url, "Starting blog-bot v{}", env!("CARGO_PKG_VERSION"));

    let api = ApiClient::new(&config.api_base_url, config.api_timeout())?;
    let bot = Bot::new(&config.bot_token);

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    let mut dispatcher = handlers::build_dispatcher(bot, BotState::new(api));
    dispatcher.dispatch().await;

    info!("blog-bot shut down");
    Ok(())
}
