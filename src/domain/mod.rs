//! Transport-agnostic domain types: networks, money, quotes, order identity.

pub mod money;
pub mod network;
pub mod order;
pub mod quote;

pub use network::Network;
pub use order::OrderKind;
pub use quote::PriceQuote;

/// Telegram numeric user id, used as the session and auth key.
pub type UserId = i64;
