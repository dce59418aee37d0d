//! Application wiring and runtime startup.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pricing::{PriceAggregator, QuoteProvider};
use crate::telegram;

pub struct App;

impl App {
    /// Wire every component and run the bot until the process shuts down.
    pub async fn run(config: Config) -> Result<()> {
        let token = config.telegram.token()?;

        let ledger = Arc::new(Ledger::open(&config.storage.data_dir)?);
        let quotes: Arc<dyn QuoteProvider> = Arc::new(PriceAggregator::new(&config.pricing));
        let auth = AuthGate::new(Arc::clone(&ledger));
        let engine = Arc::new(Engine::new(
            Arc::clone(&ledger),
            auth,
            Arc::clone(&quotes),
            config.pricing.sell_spread,
        ));

        let bot = Bot::new(token);

        tokio::spawn(telegram::broadcast::run(
            bot.clone(),
            ChatId(config.telegram.channel_chat_id),
            Arc::clone(&quotes),
            Arc::clone(&ledger),
            config.pricing.sell_spread,
        ));

        telegram::run_bot(
            bot,
            engine,
            ledger,
            ChatId(config.telegram.admin_chat_id),
        )
        .await;

        Ok(())
    }
}
