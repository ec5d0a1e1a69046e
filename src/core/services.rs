//! Implementations for the service the app needs.
//!

use crate::config::Settings;
use crate::core::commands::{BotCommand, InboundEvent};
use crate::core::messages;
use crate::core::traits::{
    CommandService, OutgoingMessage, Outcome, RandomSource, Response, SentMessage, TextFormat,
    Transport,
};
use crate::error::{DispatchError, LookupError, PersistenceError};
use crate::infrastructure::entities;
use crate::infrastructure::traits::{
    CallLogRepository, CommandRepository, MessageRepository, NewsProvider, WeatherProvider,
};
use async_trait::async_trait;
use chrono::Local;
use di::{Ref, inject, injectable};
use log::{debug, error, info, warn};
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

/// Uniform choice backed by the thread-local generator.
pub struct ThreadRandomSource;

#[injectable(RandomSource)]
impl ThreadRandomSource {
    #[inject]
    pub fn new() -> Self {
        ThreadRandomSource
    }
}

impl RandomSource for ThreadRandomSource {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// The command dispatcher.
///
/// Per invocation the order is fixed: count the call (for provider-backed
/// commands), send, then archive. Static commands count only after a
/// successful send.
pub struct BotCommandService {
    commands: Ref<dyn CommandRepository>,
    call_log: Ref<dyn CallLogRepository>,
    archive: Ref<dyn MessageRepository>,
    weather: Ref<dyn WeatherProvider>,
    news: Ref<dyn NewsProvider>,
    random: Ref<dyn RandomSource>,
    transport: Ref<dyn Transport>,
    provider_timeout: Duration,
}

#[injectable(CommandService)]
impl BotCommandService {
    #[inject]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        commands: Ref<dyn CommandRepository>,
        call_log: Ref<dyn CallLogRepository>,
        archive: Ref<dyn MessageRepository>,
        weather: Ref<dyn WeatherProvider>,
        news: Ref<dyn NewsProvider>,
        random: Ref<dyn RandomSource>,
        transport: Ref<dyn Transport>,
        settings: Ref<Settings>,
    ) -> Self {
        BotCommandService {
            commands,
            call_log,
            archive,
            weather,
            news,
            random,
            transport,
            provider_timeout: settings.provider_timeout,
        }
    }
}

#[async_trait]
impl CommandService for BotCommandService {
    async fn dispatch(&self, event: InboundEvent) -> Result<Outcome, DispatchError> {
        let Some(command) = BotCommand::from_event(&event) else {
            debug!(
                "ignoring unsupported command /{} in chat {}",
                event.command_token, event.chat_id
            );
            return Ok(Outcome::Ignored);
        };

        let invocation = Uuid::new_v4();
        info!(
            "[{invocation}] {} from {:?} in chat {}",
            command.name(),
            event.sender.as_ref().and_then(|sender| sender.handle.as_deref()),
            event.chat_id
        );

        let result = match &command {
            BotCommand::Start => self.answer_static(&event, &command, TextFormat::Plain).await,
            BotCommand::Help => self.answer_static(&event, &command, TextFormat::Html).await,
            BotCommand::Weather(city) => self.answer_weather(&event, city).await,
            BotCommand::News => self.answer_news(&event).await,
        };

        match &result {
            Ok(Outcome::Responded(response)) => {
                if let Err(e) = &response.archived {
                    error!("[{invocation}] message sent but not archived: {e}");
                }
            }
            Ok(Outcome::Ignored) => {}
            Err(e) => error!("[{invocation}] {} failed: {e}", command.name()),
        }

        result
    }
}

impl BotCommandService {
    async fn answer_static(
        &self,
        event: &InboundEvent,
        command: &BotCommand,
        format: TextFormat,
    ) -> Result<Outcome, DispatchError> {
        let text = self.commands.lookup(command.name()).await?;

        let sent = self
            .transport
            .send(OutgoingMessage {
                chat_id: event.chat_id,
                text,
                format,
                keyboard: true,
                reply_to: None,
            })
            .await?;

        let calls = self.record_call(command.name()).await;
        let archived = self.archive(&sent, Some(command.name())).await;

        Ok(Outcome::Responded(Response {
            sent,
            fallback: false,
            calls,
            archived,
        }))
    }

    async fn answer_weather(&self, event: &InboundEvent, city: &str) -> Result<Outcome, DispatchError> {
        let calls = self.record_call("/weather").await;

        let (message, fallback) = match self.weather_report(city).await {
            Ok(text) => (
                OutgoingMessage {
                    chat_id: event.chat_id,
                    text,
                    format: TextFormat::Html,
                    keyboard: true,
                    reply_to: event.message_id,
                },
                false,
            ),
            Err(e) => {
                warn!("weather lookup for `{city}` failed: {e}");
                (
                    OutgoingMessage {
                        chat_id: event.chat_id,
                        text: messages::WEATHER_FALLBACK.to_owned(),
                        format: TextFormat::Plain,
                        keyboard: true,
                        reply_to: event.message_id,
                    },
                    true,
                )
            }
        };

        self.send_and_archive(message, "/weather", fallback, calls).await
    }

    async fn answer_news(&self, event: &InboundEvent) -> Result<Outcome, DispatchError> {
        let calls = self.record_call("/news").await;

        let (message, fallback) = match self.news_story().await {
            Ok(text) => (
                OutgoingMessage {
                    chat_id: event.chat_id,
                    text,
                    format: TextFormat::Html,
                    keyboard: false,
                    reply_to: event.message_id,
                },
                false,
            ),
            Err(e) => {
                warn!("news lookup failed: {e}");
                (
                    OutgoingMessage {
                        chat_id: event.chat_id,
                        text: messages::NEWS_FALLBACK.to_owned(),
                        format: TextFormat::Plain,
                        keyboard: true,
                        reply_to: event.message_id,
                    },
                    true,
                )
            }
        };

        self.send_and_archive(message, "/news", fallback, calls).await
    }

    async fn weather_report(&self, city: &str) -> Result<String, LookupError> {
        if city.is_empty() {
            return Err(LookupError::MissingCity);
        }

        let report = tokio::time::timeout(self.provider_timeout, self.weather.fetch(city))
            .await
            .map_err(|_| LookupError::Timeout(self.provider_timeout))??;

        Ok(messages::weather_report(&report, Local::now())?)
    }

    async fn news_story(&self) -> Result<String, LookupError> {
        let stories = tokio::time::timeout(self.provider_timeout, self.news.fetch_top_stories())
            .await
            .map_err(|_| LookupError::Timeout(self.provider_timeout))??;

        if stories.is_empty() {
            return Err(LookupError::Empty);
        }

        let story = &stories[self.random.pick(stories.len())];
        Ok(messages::news_story(story)?)
    }

    /// Fallback texts are archived without a command reference.
    async fn send_and_archive(
        &self,
        message: OutgoingMessage,
        command: &str,
        fallback: bool,
        calls: Option<i64>,
    ) -> Result<Outcome, DispatchError> {
        let sent = self.transport.send(message).await?;
        let archived = self
            .archive(&sent, if fallback { None } else { Some(command) })
            .await;

        Ok(Outcome::Responded(Response {
            sent,
            fallback,
            calls,
            archived,
        }))
    }

    async fn record_call(&self, command: &str) -> Option<i64> {
        match self.call_log.record_call(command).await {
            Ok(Some(log)) => Some(log.calls_count),
            Ok(None) => {
                // Preserved no-op: a command without a stored record is not counted.
                warn!("call to {command} not counted: command is not registered");
                None
            }
            Err(e) => {
                error!("failed to count call to {command}: {e}");
                None
            }
        }
    }

    async fn archive(
        &self,
        sent: &SentMessage,
        command: Option<&str>,
    ) -> Result<entities::Message, PersistenceError> {
        self.archive.ensure_chatroom(sent.chat_id).await?;

        self.archive
            .record_sent(entities::NewMessage {
                text: sent.text.clone(),
                date: sent.date,
                message_id: i64::from(sent.message_id),
                to_whom: sent.recipient.clone(),
                chat_id: sent.chat_id,
                command: command.map(str::to_owned),
            })
            .await
    }
}
