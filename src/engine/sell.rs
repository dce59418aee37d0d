//! Sell-branch transition handlers.
//!
//! The sell branch mirrors the buy branch but collects banking details
//! sequentially; card, account, and SHEBA may each be skipped and are then
//! stored as empty strings.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info};

use crate::domain::money::Tokens;
use crate::domain::order::tracking_code;
use crate::domain::{Network, OrderKind, UserId};

use super::format;
use super::intent::Intent;
use super::reply::{Keyboard, Reply, Response};
use super::state::SessionState;
use super::Engine;

/// Smallest accepted sell order, in USDT.
const MIN_SELL_TOKENS: Tokens = dec!(1);

/// Uppercase a SHEBA number and prefix `IR` when absent.
pub(super) fn normalize_sheba(raw: &str) -> String {
    let upper = raw.to_uppercase();
    if upper.starts_with("IR") {
        upper
    } else {
        format!("IR{upper}")
    }
}

impl Engine {
    pub(super) fn handle_sell_amount(
        &self,
        user: UserId,
        sell_price: Decimal,
        intent: Intent,
    ) -> Response {
        let Intent::Raw(text) = intent else {
            return Response::single(format::amount_not_numeric(), Keyboard::CancelOnly);
        };
        let Ok(token_amount) = Decimal::from_str(&text) else {
            return Response::single(format::amount_not_numeric(), Keyboard::CancelOnly);
        };
        if token_amount < MIN_SELL_TOKENS {
            return Response::single(format::sell_amount_below_floor(), Keyboard::CancelOnly);
        }

        let amount = (token_amount * sell_price).round_dp(0);
        self.sessions.set(
            user,
            SessionState::AwaitingSellConfirm {
                sell_price,
                token_amount,
                amount,
            },
        );
        Response::single(
            format::sell_confirm_screen(sell_price, token_amount, amount),
            Keyboard::ConfirmCancel,
        )
    }

    pub(super) fn handle_sell_confirm(
        &self,
        user: UserId,
        _sell_price: Decimal,
        token_amount: Decimal,
        amount: Decimal,
        intent: Intent,
    ) -> Response {
        if intent != Intent::Confirm {
            return Response::single(format::confirm_hint(), Keyboard::ConfirmCancel);
        }

        self.sessions.set(
            user,
            SessionState::AwaitingSellNetwork {
                token_amount,
                amount,
            },
        );
        Response::single(format::network_prompt(), Keyboard::Networks)
    }

    pub(super) fn handle_sell_network(
        &self,
        user: UserId,
        token_amount: Decimal,
        amount: Decimal,
        intent: Intent,
    ) -> Response {
        let Intent::Network(network) = intent else {
            return Response::single(format::network_prompt(), Keyboard::Networks);
        };

        self.sessions.set(
            user,
            SessionState::AwaitingCardNumber {
                network,
                token_amount,
                amount,
            },
        );
        Response::single(format::card_number_prompt(), Keyboard::SkipCancel)
    }

    pub(super) fn handle_card_number(
        &self,
        user: UserId,
        network: Network,
        token_amount: Decimal,
        amount: Decimal,
        intent: Intent,
    ) -> Response {
        let card = match intent {
            Intent::Raw(text) => text,
            Intent::Skip => String::new(),
            _ => return Response::single(format::card_number_prompt(), Keyboard::SkipCancel),
        };

        self.sessions.set(
            user,
            SessionState::AwaitingAccountNumber {
                network,
                token_amount,
                amount,
                card,
            },
        );
        Response::single(format::account_number_prompt(), Keyboard::SkipCancel)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_account_number(
        &self,
        user: UserId,
        network: Network,
        token_amount: Decimal,
        amount: Decimal,
        card: String,
        intent: Intent,
    ) -> Response {
        let account = match intent {
            Intent::Raw(text) => text,
            Intent::Skip => String::new(),
            _ => return Response::single(format::account_number_prompt(), Keyboard::SkipCancel),
        };

        self.sessions.set(
            user,
            SessionState::AwaitingShebaNumber {
                network,
                token_amount,
                amount,
                card,
                account,
            },
        );
        Response::single(format::sheba_prompt(), Keyboard::SkipCancel)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_sheba_number(
        &self,
        user: UserId,
        network: Network,
        token_amount: Decimal,
        amount: Decimal,
        card: String,
        account: String,
        intent: Intent,
    ) -> Response {
        let sheba = match intent {
            Intent::Raw(text) => normalize_sheba(&text),
            Intent::Skip => String::new(),
            _ => return Response::single(format::sheba_prompt(), Keyboard::SkipCancel),
        };

        self.sessions.set(
            user,
            SessionState::AwaitingAccountHolder {
                network,
                token_amount,
                amount,
                card,
                account,
                sheba,
            },
        );
        Response::single(format::account_holder_prompt(), Keyboard::CancelOnly)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_account_holder(
        &self,
        user: UserId,
        display_name: &str,
        network: Network,
        token_amount: Decimal,
        amount: Decimal,
        card: String,
        account: String,
        sheba: String,
        intent: Intent,
    ) -> Response {
        let Intent::Raw(holder) = intent else {
            return Response::single(format::account_holder_required(), Keyboard::CancelOnly);
        };

        // The deposit address must already be provisioned; a missing one is
        // fatal to this order only and never silently substituted.
        let Some(deposit_address) = self.ledger.wallet(network) else {
            error!(user_id = user, network = %network, "no deposit wallet configured");
            self.sessions.remove(user);
            return Response::single(format::wallet_unconfigured(network), Keyboard::MainMenu);
        };

        let order_no = match self.ledger.next_order_number(OrderKind::Sell) {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, user_id = user, "sell order counter write failed");
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
            "sell order registered"
        );

        Response::order(
            Reply::new(
                format::sell_registered(
                    order_no,
                    &tracking,
                    token_amount,
                    amount,
                    network,
                    &deposit_address,
                ),
                Keyboard::MainMenu,
            ),
            format::sell_operator_note(
                display_name,
                user,
                order_no,
                &tracking,
                token_amount,
                amount,
                network,
                &card,
                &account,
                &sheba,
                &holder,
            ),
        )
    }
}
