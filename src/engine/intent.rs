//! Canned-label classification of incoming text.
//!
//! The transport delivers free text; anything equal to a known reply-keyboard
//! label becomes an enumerated intent, everything else stays raw field input.
//! Keeping this as an explicit classification step leaves the transition
//! handlers free of string literals.

use crate::domain::Network;

/// Reply-keyboard labels. These exact strings are what Telegram sends back
/// when a user presses the corresponding button.
pub mod labels {
    pub const PRICE: &str = "💵 Tether Price";
    pub const BUY: &str = "🛒 Buy Tether";
    pub const SELL: &str = "💱 Sell Tether";
    pub const CONFIRM: &str = "✅ Confirm";
    pub const CANCEL: &str = "❌ Cancel";
    pub const SKIP: &str = "⏭ Skip";
}

/// What one incoming text event means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The price button. Doubles as the global interrupt from any state.
    Price,
    Buy,
    Sell,
    Confirm,
    Cancel,
    Skip,
    /// The `/start` command.
    Start,
    /// A network selection button.
    Network(Network),
    /// Free text that matched no known label.
    Raw(String),
}

/// Classify one incoming text event.
pub fn classify(text: &str) -> Intent {
    let trimmed = text.trim();
    match trimmed {
        labels::PRICE => Intent::Price,
        labels::BUY => Intent::Buy,
        labels::SELL => Intent::Sell,
        labels::CONFIRM => Intent::Confirm,
        labels::CANCEL => Intent::Cancel,
        labels::SKIP => Intent::Skip,
        "/start" => Intent::Start,
        _ => match Network::from_label(trimmed) {
            Some(network) => Intent::Network(network),
            None => Intent::Raw(trimmed.to_string()),
        },
    }
}
