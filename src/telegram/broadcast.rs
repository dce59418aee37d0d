//! Periodic quote broadcast to the public channel.
//!
//! Runs on its own timer task, independent of user sessions. The interval
//! is re-read from the ledger on every tick, so `/interval` takes effect on
//! the next cycle without a restart.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::engine::format::quote_message;
use crate::ledger::Ledger;
use crate::pricing::QuoteProvider;

pub async fn run(
    bot: Bot,
    channel: ChatId,
    quotes: Arc<dyn QuoteProvider>,
    ledger: Arc<Ledger>,
    sell_spread: Decimal,
) {
    info!(chat_id = channel.0, "channel broadcaster started");

    loop {
        let minutes = ledger.settings().channel_interval_minutes.max(1);
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;

        let quote = quotes.quote().await;
        if !quote.has_spot() {
            warn!("skipping channel broadcast, quote unavailable");
            continue;
        }

        if let Err(e) = bot
            .send_message(channel, quote_message(&quote, sell_spread))
            .await
        {
            error!(error = %e, "channel broadcast failed");
        }
    }
}
