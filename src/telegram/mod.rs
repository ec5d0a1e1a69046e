//! Telegram long-polling front end

pub mod transport;

use crate::core::commands::{BotCommand, InboundEvent, Sender};
use crate::core::traits::CommandService;
use di::Ref;
use log::{debug, info};
use teloxide::dptree;
use teloxide::prelude::*;

/// Runs the update dispatcher until Ctrl-C.
///
/// Commands are recognized against this bot's own username, so a command
/// addressed to another bot in a group never reaches the service. Failed
/// invocations are logged by the service and never stop the loop.
pub async fn run(bot: Bot, service: Ref<dyn CommandService>) {
    let handler = Update::filter_message()
        .filter_command::<BotCommand>()
        .map(inbound_event)
        .endpoint(handle_event);

    info!("starting telegram dispatcher");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service])
        .default_handler(|update| async move {
            debug!("unhandled update {:?}", update.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "error in command handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram dispatcher stopped");
}

fn inbound_event(msg: Message, command: BotCommand) -> InboundEvent {
    let sender = msg.from.as_ref().map(|user| Sender {
        id: user.id.0,
        handle: user.username.clone(),
    });

    InboundEvent::from_command(&command, sender, msg.chat.id.0, Some(msg.id.0))
}

async fn handle_event(event: InboundEvent, service: Ref<dyn CommandService>) -> ResponseResult<()> {
    // Failures are logged by the service with the invocation id; the update
    // is finished either way.
    if let Err(e) = service.dispatch(event).await {
        debug!("update not answered: {e}");
    }
    Ok(())
}
