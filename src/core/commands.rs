//! Inbound chat events and the set of supported commands

use teloxide::utils::command::{BotCommands, ParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub handle: Option<String>,
}

/// A command-looking message received from a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Command name without the leading `/` or `@bot` suffix.
    pub command_token: String,
    pub argument_text: String,
    pub sender: Option<Sender>,
    pub chat_id: i64,
    /// Telegram id of the triggering message, used to thread replies.
    pub message_id: Option<i32>,
}

impl InboundEvent {
    pub fn from_command(
        command: &BotCommand,
        sender: Option<Sender>,
        chat_id: i64,
        message_id: Option<i32>,
    ) -> InboundEvent {
        let argument_text = match command {
            BotCommand::Weather(city) => city.clone(),
            _ => String::new(),
        };

        InboundEvent {
            command_token: command.name().trim_start_matches('/').to_owned(),
            argument_text,
            sender,
            chat_id,
            message_id,
        }
    }

    /// Parses a message text like `/weather@my_bot New York` addressed to
    /// `bot_name`. Unknown commands are kept as raw tokens; text that is not a
    /// command, or a command meant for another bot, gives `None`.
    pub fn parse(
        text: &str,
        bot_name: &str,
        sender: Option<Sender>,
        chat_id: i64,
        message_id: Option<i32>,
    ) -> Option<InboundEvent> {
        match BotCommand::parse(text.trim_start(), bot_name) {
            Ok(command) => Some(InboundEvent::from_command(&command, sender, chat_id, message_id)),
            Err(ParseError::UnknownCommand(raw)) => {
                let token = raw.strip_prefix('/').filter(|token| !token.is_empty())?;
                let argument_text = text
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .map(|(_, rest)| rest.trim().to_owned())
                    .unwrap_or_default();

                Some(InboundEvent {
                    command_token: token.to_owned(),
                    argument_text,
                    sender,
                    chat_id,
                    message_id,
                })
            }
            Err(_) => None,
        }
    }
}

#[derive(BotCommands, Debug, Clone, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum BotCommand {
    #[command(description = "greet the user")]
    Start,
    #[command(description = "list supported commands")]
    Help,
    #[command(description = "current weather in a city", parse_with = city_argument)]
    Weather(String),
    #[command(description = "a random popular story")]
    News,
}

/// `/weather` without a city still parses; the dispatcher answers it with the
/// fallback text.
fn city_argument(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_owned(),))
}

impl BotCommand {
    /// Maps an event onto a supported command; unsupported tokens give `None`.
    pub fn from_event(event: &InboundEvent) -> Option<BotCommand> {
        match event.command_token.as_str() {
            "start" => Some(BotCommand::Start),
            "help" => Some(BotCommand::Help),
            "weather" => Some(BotCommand::Weather(event.argument_text.trim().to_owned())),
            "news" => Some(BotCommand::News),
            _ => None,
        }
    }

    /// Name under which the command is stored and counted.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "/start",
            BotCommand::Help => "/help",
            BotCommand::Weather(_) => "/weather",
            BotCommand::News => "/news",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_NAME: &str = "forecast_bot";

    fn parse(text: &str) -> Option<InboundEvent> {
        InboundEvent::parse(text, BOT_NAME, None, 42, Some(7))
    }

    #[test]
    fn test_parse_plain_command() {
        let event = parse("/start").unwrap();
        assert_eq!(event.command_token, "start");
        assert_eq!(event.argument_text, "");
        assert_eq!(event.chat_id, 42);
        assert_eq!(event.message_id, Some(7));
    }

    #[test]
    fn test_parse_argument_and_own_mention() {
        let event = parse("/weather@forecast_bot   New York ").unwrap();
        assert_eq!(event.command_token, "weather");
        assert_eq!(event.argument_text, "New York");

        let event = parse("/news@Forecast_Bot").unwrap();
        assert_eq!(event.command_token, "news");
    }

    #[test]
    fn test_parse_ignores_commands_for_other_bots() {
        assert_eq!(parse("/start@some_other_bot"), None);
        assert_eq!(parse("/weather@some_other_bot London"), None);
        assert_eq!(parse("/xyz@some_other_bot"), None);
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("/"), None);
        assert_eq!(parse("/@bot"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_keeps_unknown_tokens() {
        let event = parse("/xyz some words").unwrap();
        assert_eq!(event.command_token, "xyz");
        assert_eq!(event.argument_text, "some words");
    }

    #[test]
    fn test_supported_commands() {
        assert_eq!(BotCommand::from_event(&parse("/start").unwrap()), Some(BotCommand::Start));
        assert_eq!(BotCommand::from_event(&parse("/help").unwrap()), Some(BotCommand::Help));
        assert_eq!(BotCommand::from_event(&parse("/news").unwrap()), Some(BotCommand::News));
        assert_eq!(
            BotCommand::from_event(&parse("/weather London").unwrap()),
            Some(BotCommand::Weather("London".to_owned()))
        );
        assert_eq!(
            BotCommand::from_event(&parse("/weather").unwrap()),
            Some(BotCommand::Weather(String::new()))
        );
    }

    #[test]
    fn test_derived_parse_matches_stored_names() {
        assert_eq!(
            BotCommand::parse("/weather Rio de Janeiro", BOT_NAME).unwrap(),
            BotCommand::Weather("Rio de Janeiro".to_owned())
        );
        assert!(matches!(
            BotCommand::parse("/start@some_other_bot", BOT_NAME),
            Err(ParseError::WrongBotName(_))
        ));
    }

    #[test]
    fn test_event_from_parsed_command() {
        let event = InboundEvent::from_command(&BotCommand::Weather("Oslo".into()), None, 5, None);
        assert_eq!(event.command_token, "weather");
        assert_eq!(event.argument_text, "Oslo");
        assert_eq!(BotCommand::from_event(&event), Some(BotCommand::Weather("Oslo".into())));
    }

    #[test]
    fn test_unsupported_command_is_not_recognized() {
        assert_eq!(BotCommand::from_event(&parse("/xyz").unwrap()), None);
        assert_eq!(BotCommand::from_event(&parse("/starts").unwrap()), None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(BotCommand::Start.name(), "/start");
        assert_eq!(BotCommand::Weather("Paris".into()).name(), "/weather");
    }
}
