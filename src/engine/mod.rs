//! The per-user conversation state machine.
//!
//! [`Engine::handle`] receives one text event at a time for a user,
//! consults the auth gate, quote provider, and ledger, mutates the session
//! store, and emits the next prompt. It never fails outward: every input
//! problem is answered with a re-prompt in the same state, and every
//! infrastructure problem degrades to an apology plus a return to idle.
//!
//! Ordering: a per-user gate serializes one user's events; distinct users
//! dispatch in parallel. Quotes are fetched before the gate is taken so a
//! slow upstream source never stalls an otherwise-independent session.

mod buy;
mod sell;
mod verify;

pub(crate) mod format;
pub mod intent;
pub mod reply;
pub mod state;
pub mod store;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::auth::AuthGate;
use crate::domain::{OrderKind, PriceQuote, UserId};
use crate::ledger::Ledger;
use crate::pricing::QuoteProvider;

use self::intent::{classify, Intent};
use self::reply::{Keyboard, Response};
use self::state::SessionState;
use self::store::SessionStore;

pub struct Engine {
    sessions: SessionStore,
    auth: AuthGate,
    ledger: Arc<Ledger>,
    quotes: Arc<dyn QuoteProvider>,
    sell_spread: Decimal,
}

impl Engine {
    pub fn new(
        ledger: Arc<Ledger>,
        auth: AuthGate,
        quotes: Arc<dyn QuoteProvider>,
        sell_spread: Decimal,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            auth,
            ledger,
            quotes,
            sell_spread,
        }
    }

    /// Handle one incoming text event for `user`.
    pub async fn handle(&self, user: UserId, display_name: &str, text: &str) -> Response {
        let intent = classify(text);

        // The price button is the global interrupt: checked before any
        // state-specific branch, it discards whatever flow was in progress
        // and re-renders the quote.
        if intent == Intent::Price {
            self.sessions.remove(user);
            let quote = self.quotes.quote().await;
            return Response::single(
                format::quote_message(&quote, self.sell_spread),
                Keyboard::MainMenu,
            );
        }

        let quote = if self.entry_needs_quote(user, &intent) {
            Some(self.quotes.quote().await)
        } else {
            None
        };

        let gate = self.sessions.user_gate(user);
        let _guard = gate.lock().await;

        // A missing session is idle, never a fault, even when the event
        // looks like it belongs to a flow.
        let Some(current) = self.sessions.get(user) else {
            return self.handle_idle(user, display_name, intent, quote);
        };

        if intent == Intent::Cancel {
            self.sessions.remove(user);
            return Response::single(format::cancelled(), Keyboard::MainMenu);
        }

        match current {
            SessionState::AwaitingSubscribeCode { service } => {
                self.handle_subscribe_code(user, service, intent)
            }
            SessionState::AwaitingNationalId { service, code } => {
                self.handle_national_id(user, service, code, intent, quote)
            }
            SessionState::AwaitingBuyAmount { price } => {
                self.handle_buy_amount(user, price, intent)
            }
            SessionState::AwaitingBuyConfirm {
                price,
                amount,
                token_amount,
            } => self.handle_buy_confirm(user, price, amount, token_amount, intent),
            SessionState::AwaitingBuyNetwork {
                amount,
                token_amount,
            } => self.handle_buy_network(user, amount, token_amount, intent),
            SessionState::AwaitingBuyWallet {
                network,
                amount,
                final_token_amount,
            } => self.handle_buy_wallet(
                user,
                display_name,
                network,
                amount,
                final_token_amount,
                intent,
            ),
            SessionState::AwaitingSellAmount { sell_price } => {
                self.handle_sell_amount(user, sell_price, intent)
            }
            SessionState::AwaitingSellConfirm {
                sell_price,
                token_amount,
                amount,
            } => self.handle_sell_confirm(user, sell_price, token_amount, amount, intent),
            SessionState::AwaitingSellNetwork {
                token_amount,
                amount,
            } => self.handle_sell_network(user, token_amount, amount, intent),
            SessionState::AwaitingCardNumber {
                network,
                token_amount,
                amount,
            } => self.handle_card_number(user, network, token_amount, amount, intent),
            SessionState::AwaitingAccountNumber {
                network,
                token_amount,
                amount,
                card,
            } => self.handle_account_number(user, network, token_amount, amount, card, intent),
            SessionState::AwaitingShebaNumber {
                network,
                token_amount,
                amount,
                card,
                account,
            } => self.handle_sheba_number(
                user,
                network,
                token_amount,
                amount,
                card,
                account,
                intent,
            ),
            SessionState::AwaitingAccountHolder {
                network,
                token_amount,
                amount,
                card,
                account,
                sheba,
            } => self.handle_account_holder(
                user,
                display_name,
                network,
                token_amount,
                amount,
                card,
                account,
                sheba,
                intent,
            ),
        }
    }

    /// Whether dispatching `intent` may open a flow that needs a fresh quote.
    fn entry_needs_quote(&self, user: UserId, intent: &Intent) -> bool {
        match intent {
            Intent::Buy | Intent::Sell => self.auth.authorize(user),
            _ => matches!(
                self.sessions.get(user),
                Some(SessionState::AwaitingNationalId { .. })
            ),
        }
    }

    fn handle_idle(
        &self,
        user: UserId,
        display_name: &str,
        intent: Intent,
        quote: Option<PriceQuote>,
    ) -> Response {
        match intent {
            Intent::Start => Response::single(format::greeting(display_name), Keyboard::MainMenu),
            Intent::Buy => self.enter_service(user, OrderKind::Buy, quote),
            Intent::Sell => self.enter_service(user, OrderKind::Sell, quote),
            _ => Response::single(format::menu_hint(), Keyboard::MainMenu),
        }
    }

    fn enter_service(
        &self,
        user: UserId,
        service: OrderKind,
        quote: Option<PriceQuote>,
    ) -> Response {
        if !self.auth.authorize(user) {
            self.sessions
                .set(user, SessionState::AwaitingSubscribeCode { service });
            return Response::single(format::subscribe_code_prompt(service), Keyboard::CancelOnly);
        }
        self.begin_order(user, service, quote)
    }

    /// Open the amount-collection state for `service` using the quote taken
    /// at entry. Without a usable spot price the flow is refused rather
    /// than opened against a zero rate.
    fn begin_order(&self, user: UserId, service: OrderKind, quote: Option<PriceQuote>) -> Response {
        let quote = quote.unwrap_or_default();

        match service {
            OrderKind::Buy if quote.has_spot() => {
                self.sessions
                    .set(user, SessionState::AwaitingBuyAmount { price: quote.buy });
                Response::single(format::buy_amount_prompt(quote.buy), Keyboard::CancelOnly)
            }
            OrderKind::Sell if quote.sell_price(self.sell_spread) > Decimal::ZERO => {
                let sell_price = quote.sell_price(self.sell_spread);
                self.sessions
                    .set(user, SessionState::AwaitingSellAmount { sell_price });
                Response::single(format::sell_amount_prompt(sell_price), Keyboard::CancelOnly)
            }
            _ => {
                warn!(user_id = user, service = %service, "refusing flow entry without a spot price");
                self.sessions.remove(user);
                Response::single(format::quote_unavailable(), Keyboard::MainMenu)
            }
        }
    }
}

#[cfg(test)]
mod tests;
