//! Conversation session states.
//!
//! Each variant carries exactly the fields its outgoing transitions need;
//! a transition replaces the payload wholesale, so no stale field from a
//! prior state can leak forward. The idle state is the absence of a
//! session.

use crate::domain::money::{Rial, Tokens};
use crate::domain::{Network, OrderKind};

/// Where one user currently is in a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// First verification step of `service`.
    AwaitingSubscribeCode { service: OrderKind },
    /// Second verification step; `code` already passed the first step.
    AwaitingNationalId { service: OrderKind, code: String },

    // Buy branch.
    AwaitingBuyAmount {
        /// Quoted buy price at flow entry, IRR per USDT.
        price: Rial,
    },
    AwaitingBuyConfirm {
        price: Rial,
        /// What the user pays.
        amount: Rial,
        /// What the user receives before the network fee.
        token_amount: Tokens,
    },
    AwaitingBuyNetwork {
        amount: Rial,
        token_amount: Tokens,
    },
    AwaitingBuyWallet {
        network: Network,
        amount: Rial,
        /// Token amount after the network fee.
        final_token_amount: Tokens,
    },

    // Sell branch.
    AwaitingSellAmount {
        /// Quoted sell price at flow entry, IRR per USDT.
        sell_price: Rial,
    },
    AwaitingSellConfirm {
        sell_price: Rial,
        token_amount: Tokens,
        /// What the user receives.
        amount: Rial,
    },
    AwaitingSellNetwork {
        token_amount: Tokens,
        amount: Rial,
    },
    AwaitingCardNumber {
        network: Network,
        token_amount: Tokens,
        amount: Rial,
    },
    AwaitingAccountNumber {
        network: Network,
        token_amount: Tokens,
        amount: Rial,
        /// Skipped fields are stored as empty strings.
        card: String,
    },
    AwaitingShebaNumber {
        network: Network,
        token_amount: Tokens,
        amount: Rial,
        card: String,
        account: String,
    },
    AwaitingAccountHolder {
        network: Network,
        token_amount: Tokens,
        amount: Rial,
        card: String,
        account: String,
        sheba: String,
    },
}
