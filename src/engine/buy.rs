//! Buy-branch transition handlers.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info};

use crate::domain::money::Rial;
use crate::domain::order::tracking_code;
use crate::domain::{Network, OrderKind, UserId};

use super::format;
use super::intent::Intent;
use super::reply::{Keyboard, Reply, Response};
use super::state::SessionState;
use super::Engine;

/// Smallest accepted buy order, in IRR.
const MIN_BUY_RIAL: Rial = dec!(1_000_000);

impl Engine {
    pub(super) fn handle_buy_amount(
        &self,
        user: UserId,
        price: Decimal,
        intent: Intent,
    ) -> Response {
        let Intent::Raw(text) = intent else {
            return Response::single(format::amount_not_numeric(), Keyboard::CancelOnly);
        };
        let Ok(amount) = Decimal::from_str(&text) else {
            return Response::single(format::amount_not_numeric(), Keyboard::CancelOnly);
        };
        if amount < MIN_BUY_RIAL {
            return Response::single(format::buy_amount_below_floor(), Keyboard::CancelOnly);
        }

        let token_amount = (amount / price).round_dp(2);
        self.sessions.set(
            user,
            SessionState::AwaitingBuyConfirm {
                price,
                amount,
                token_amount,
            },
        );
        Response::single(
            format::buy_confirm_screen(price, amount, token_amount),
            Keyboard::ConfirmCancel,
        )
    }

    pub(super) fn handle_buy_confirm(
        &self,
        user: UserId,
        _price: Decimal,
        amount: Decimal,
        token_amount: Decimal,
        intent: Intent,
    ) -> Response {
        if intent != Intent::Confirm {
            return Response::single(format::confirm_hint(), Keyboard::ConfirmCancel);
        }

        self.sessions.set(
            user,
            SessionState::AwaitingBuyNetwork {
                amount,
                token_amount,
            },
        );
        Response::single(format::network_prompt(), Keyboard::Networks)
    }

    pub(super) fn handle_buy_network(
        &self,
        user: UserId,
        amount: Decimal,
        token_amount: Decimal,
        intent: Intent,
    ) -> Response {
        let Intent::Network(network) = intent else {
            return Response::single(format::network_prompt(), Keyboard::Networks);
        };

        let final_token_amount = token_amount - network.fee();
        if final_token_amount <= Decimal::ZERO {
            return Response::single(format::network_fee_too_high(network), Keyboard::Networks);
        }

        self.sessions.set(
            user,
            SessionState::AwaitingBuyWallet {
                network,
                amount,
                final_token_amount,
            },
        );
        Response::single(
            format::wallet_prompt(network, final_token_amount),
            Keyboard::CancelOnly,
        )
    }

    pub(super) fn handle_buy_wallet(
        &self,
        user: UserId,
        display_name: &str,
        network: Network,
        amount: Decimal,
        final_token_amount: Decimal,
        intent: Intent,
    ) -> Response {
        let Intent::Raw(address) = intent else {
            return Response::single(format::wallet_address_required(), Keyboard::CancelOnly);
        };

        let order_no = match self.ledger.next_order_number(OrderKind::Buy) {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, user_id = user, "buy order counter write failed");
                self.sessions.remove(user);
                return Response::single(format::ledger_failure(), Keyboard::MainMenu);
            }
        };
        self.sessions.remove(user);

        let tracking = tracking_code(user);
        info!(
            user_id = user,
            order_no,
            tracking = %tracking,
            network = %network,
            "buy order registered"
        );

        Response::order(
            Reply::new(
                format::buy_registered(
                    order_no,
                    &tracking,
                    amount,
                    final_token_amount,
                    network,
                    &address,
                ),
                Keyboard::MainMenu,
            ),
            format::buy_operator_note(
                display_name,
                user,
                order_no,
                &tracking,
                amount,
                final_token_amount,
                network,
                &address,
            ),
        )
    }
}
