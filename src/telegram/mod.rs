//! Telegram transport adapter.
//!
//! Maps incoming messages onto [`Engine::handle`] and renders the engine's
//! keyboard variants into Telegram reply keyboards. Operator commands from
//! the admin chat are intercepted before the engine sees them. Delivery
//! failures are logged and never fed back into the conversation flow.

pub mod admin;
pub mod broadcast;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};
use tracing::{error, info};

use crate::engine::reply::Keyboard;
use crate::engine::Engine;
use crate::ledger::Ledger;

/// Run the long-polling bot loop until the process shuts down.
pub async fn run_bot(bot: Bot, engine: Arc<Engine>, ledger: Arc<Ledger>, admin_chat: ChatId) {
    info!(admin_chat = admin_chat.0, "telegram listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let engine = Arc::clone(&engine);
        let ledger = Arc::clone(&ledger);
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            // Operator commands short-circuit; anything else in the admin
            // chat falls through to the normal conversation flow.
            if let Some(response) =
                admin::admin_response_for_message(text, msg.chat.id, admin_chat, &ledger)
            {
                if let Err(e) = bot.send_message(msg.chat.id, response).await {
                    error!(error = %e, "failed to send operator response");
                }
                return respond(());
            }

            let user_id = msg.chat.id.0;
            let display_name = msg
                .from
                .as_ref()
                .map(|u| u.first_name.clone())
                .unwrap_or_default();

            let outcome = engine.handle(user_id, &display_name, text).await;

            for reply in &outcome.replies {
                let mut request = bot.send_message(msg.chat.id, &reply.text);
                if let Some(markup) = render_keyboard(reply.keyboard) {
                    request = request.reply_markup(markup);
                }
                if let Err(e) = request.await {
                    error!(error = %e, user_id, "failed to deliver reply");
                }
            }

            if let Some(note) = outcome.operator_note {
                if ledger.settings().order_notifications {
                    // The order is already committed; a failed notification
                    // is logged and never rolls it back.
                    if let Err(e) = bot.send_message(admin_chat, note).await {
                        error!(error = %e, user_id, "failed to notify operator");
                    }
                }
            }

            respond(())
        }
    })
    .await;
}

/// Render an engine keyboard variant into a Telegram reply keyboard.
fn render_keyboard(keyboard: Keyboard) -> Option<ReplyMarkup> {
    let rows = keyboard.rows()?;
    let buttons: Vec<Vec<KeyboardButton>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect();

    Some(ReplyMarkup::Keyboard(
        KeyboardMarkup::new(buttons).resize_keyboard(),
    ))
}
