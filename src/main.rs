//! Telegram command bot

use chat_command_bot::config::Settings;
use chat_command_bot::core::services::{BotCommandService, ThreadRandomSource};
use chat_command_bot::core::traits::CommandService;
use chat_command_bot::infrastructure::database::DatabaseConnection;
use chat_command_bot::infrastructure::providers::{NyTimesNewsProvider, OpenWeatherMapProvider};
use chat_command_bot::infrastructure::repositories::{
    DbCallLogRepository, DbCommandRepository, DbMessageRepository,
};
use chat_command_bot::infrastructure::traits::{
    CallLogRepository, CommandRepository, MessageRepository,
};
use chat_command_bot::telegram;

use anyhow::anyhow;
use di::{Injectable, ServiceCollection, existing_as_self};
use log::{info, warn};
use teloxide::Bot;
use tokio::runtime::{Builder, Runtime};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;
    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(bot_task(settings))
}

async fn bot_task(settings: Settings) -> anyhow::Result<()> {
    let connection = DatabaseConnection::connect(&settings).await?;
    connection.migrate().await?;

    let bot = Bot::new(&settings.telegram_token);

    let provider = ServiceCollection::new()
        .add(existing_as_self(settings))
        .add(existing_as_self(connection))
        .add(existing_as_self(bot.clone()))
        .add(DbCommandRepository::singleton())
        .add(DbCallLogRepository::singleton())
        .add(DbMessageRepository::singleton())
        .add(OpenWeatherMapProvider::singleton())
        .add(NyTimesNewsProvider::singleton())
        .add(ThreadRandomSource::singleton())
        .add(telegram::transport::TelegramTransport::singleton())
        .add(BotCommandService::singleton())
        .build_provider()
        .map_err(|e| anyhow!("invalid service configuration: {e:?}"))?;

    let commands = provider.get_required::<dyn CommandRepository>();
    let registered: Vec<String> = commands
        .list_commands()
        .await?
        .into_iter()
        .map(|command| command.command)
        .collect();
    if registered.is_empty() {
        warn!("no commands registered; /start and /help will not be answered");
    } else {
        info!("registered commands: {}", registered.join(", "));
    }

    let call_log = provider.get_required::<dyn CallLogRepository>();
    for popular in call_log.popular_commands().await? {
        info!("{}: {} calls", popular.command, popular.calls_count);
    }

    let archive = provider.get_required::<dyn MessageRepository>();
    info!("known chatrooms: {}", archive.list_chatrooms().await?.len());

    let service = provider.get_required::<dyn CommandService>();
    telegram::run(bot, service).await;

    info!("Shutting down...");
    Ok(())
}
