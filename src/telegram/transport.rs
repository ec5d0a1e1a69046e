//! Outbound messages through the Telegram Bot API

use crate::core::traits::{OutgoingMessage, SentMessage, TextFormat, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, MessageId, ParseMode, ReplyParameters};

pub struct TelegramTransport {
    bot: Ref<Bot>,
}

#[injectable(Transport)]
impl TelegramTransport {
    #[inject]
    pub fn new(bot: Ref<Bot>) -> Self {
        TelegramTransport { bot }
    }
}

/// Reply keyboard offered under most answers.
pub fn default_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new([
        [KeyboardButton::new("/help")],
        [KeyboardButton::new("/news")],
    ])
    .resize_keyboard()
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, message: OutgoingMessage) -> Result<SentMessage, TransportError> {
        let mut request = self.bot.send_message(ChatId(message.chat_id), message.text);

        if message.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if message.keyboard {
            request = request.reply_markup(default_keyboard());
        }
        if let Some(reply_to) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }

        let sent = request.await?;

        Ok(SentMessage {
            message_id: sent.id.0,
            date: sent.date,
            chat_id: sent.chat.id.0,
            recipient: sent.chat.username().map(str::to_owned),
            text: sent.text().unwrap_or_default().to_owned(),
        })
    }
}
