//! Proactive bot web server.
//!
//! Hosts the channel webhook and the notify trigger on top of the
//! proactive-bot libraries.

pub mod config;
pub mod error;
pub mod routes;

use config::ServerConfig;
use proactive_bot_conversation::{InMemoryReferenceStore, ReferenceStore};
use proactive_bot_dispatch::{ProactiveBot, ProactiveDispatcher};
use proactive_bot_integration::{BotAdapter, HttpChannelConnector};
use routes::AppState;
use std::sync::Arc;

/// Wires the store, adapter, bot and dispatcher for `config`.
#[must_use]
pub fn build_state(config: &ServerConfig) -> AppState {
    let store: Arc<dyn ReferenceStore> = Arc::new(InMemoryReferenceStore::new());
    let connector = Arc::new(HttpChannelConnector::new(config.bot.credentials()));
    let adapter = BotAdapter::new(connector);

    let bot = ProactiveBot::new(store.clone()).with_notify_url(config.notify_url());
    let dispatcher = ProactiveDispatcher::new(adapter.clone(), store)
        .with_message(&config.bot.proactive_message);

    AppState {
        adapter,
        bot: Arc::new(bot),
        dispatcher,
    }
}
