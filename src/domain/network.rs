//! Supported token-transfer networks and their fixed fees.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A token-transfer rail the desk supports for deposits and withdrawals.
///
/// Serialized by its canonical label so the wallet table stays human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "TRC20")]
    Trc20,
    #[serde(rename = "BEP20")]
    Bep20,
    #[serde(rename = "Solana")]
    Solana,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Erc20,
        Network::Trc20,
        Network::Bep20,
        Network::Solana,
    ];

    /// Fixed network fee in USDT, subtracted from the transferred amount.
    pub fn fee(self) -> Decimal {
        match self {
            Network::Erc20 => dec!(7),
            Network::Trc20 => dec!(5),
            Network::Bep20 => dec!(2),
            Network::Solana => dec!(2),
        }
    }

    /// Canonical label, used on keyboards and in the wallet table.
    pub fn label(self) -> &'static str {
        match self {
            Network::Erc20 => "ERC20",
            Network::Trc20 => "TRC20",
            Network::Bep20 => "BEP20",
            Network::Solana => "Solana",
        }
    }

    /// Exact-match lookup from a keyboard label.
    pub fn from_label(label: &str) -> Option<Network> {
        Network::ALL.into_iter().find(|n| n.label() == label)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
