use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::MessageEntityKind;
use tracing::{error, info, warn};

use crate::bridge::Bridge;
use crate::platform::{IncomingMessage, Mention};

/// Run the Telegram platform, watching only `group_id`
pub async fn run(bridge: Arc<Bridge>, group_id: i64, bot: Bot) -> Result<()> {
    let me = bot
        .get_me()
        .await
        .context("Failed to fetch bot identity from Telegram")?;
    let bot_user_id = me.user.id;

    info!(
        "Starting Telegram platform as {} (watching group {})...",
        bot_user_id.0, group_id
    );

    let handler = Update::filter_message()
        .filter_map(move |msg: Message| {
            if msg.chat.id.0 != group_id {
                return None;
            }
            // ignore our own messages so confirmations never loop
            let user = msg.from.as_ref()?;
            if user.id == bot_user_id {
                return None;
            }
            Some(msg)
        })
        .endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![bridge])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, bridge: Arc<Bridge>) -> ResponseResult<()> {
    let user = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let incoming = IncomingMessage {
        platform: "telegram".to_string(),
        sender_id: user.id.0.to_string(),
        chat_id: msg.chat.id.0.to_string(),
        sender_name: user.first_name.clone(),
        text,
        timestamp_ms: msg.date.timestamp_millis(),
        mentions: collect_mentions(&msg),
    };

    if let Some(reply) = bridge.process_message(&incoming).await {
        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
            error!("Failed to send confirmation to {}: {}", msg.chat.id.0, e);
        }
    }

    Ok(())
}

/// Users referenced in the message. Text mentions carry the user; plain
/// `@handle` mentions only carry the handle, which doubles as the name.
fn collect_mentions(msg: &Message) -> Vec<Mention> {
    msg.parse_entities()
        .unwrap_or_default()
        .iter()
        .filter_map(|entity| match entity.kind() {
            MessageEntityKind::TextMention { user } => Some(Mention {
                id: user.id.0.to_string(),
                display_name: user.first_name.clone(),
            }),
            MessageEntityKind::Mention => {
                let handle = entity.text().trim_start_matches('@').to_string();
                Some(Mention {
                    id: handle.clone(),
                    display_name: handle,
                })
            }
            _ => None,
        })
        .collect()
}
