use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::auth::AuthGate;
use crate::domain::{Network, PriceQuote};
use crate::ledger::Ledger;
use crate::pricing::QuoteProvider;

use super::intent::labels;
use super::reply::{Keyboard, Response};
use super::state::SessionState;
use super::Engine;

struct FixedQuotes(PriceQuote);

#[async_trait]
impl QuoteProvider for FixedQuotes {
    async fn quote(&self) -> PriceQuote {
        self.0.clone()
    }
}

fn desk_quote() -> PriceQuote {
    PriceQuote::compose(dec!(61500), dec!(4500000), dec!(2400))
}

fn engine_with(quote: PriceQuote) -> (Engine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(Ledger::open(dir.path()).unwrap());
    ledger.upsert_code("GOLD1", "1234567890", true).unwrap();
    ledger.set_wallet(Network::Trc20, "TDeskDeposit").unwrap();

    let auth = AuthGate::new(Arc::clone(&ledger));
    let engine = Engine::new(ledger, auth, Arc::new(FixedQuotes(quote)), dec!(500));
    (engine, dir)
}

fn engine() -> (Engine, tempfile::TempDir) {
    engine_with(desk_quote())
}

fn text_of(response: &Response) -> String {
    response
        .replies
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n")
}

async fn drive(engine: &Engine, user: i64, inputs: &[&str]) -> Response {
    let mut last = Response::default();
    for input in inputs {
        last = engine.handle(user, "Tester", input).await;
    }
    last
}

// -------------------------------------------------------------------------
// Idle and global behavior
// -------------------------------------------------------------------------

#[tokio::test]
async fn start_greets_with_the_main_menu() {
    let (engine, _dir) = engine();

    let response = engine.handle(7, "Ava", "/start").await;

    assert!(text_of(&response).contains("Ava"));
    assert_eq!(response.replies[0].keyboard, Keyboard::MainMenu);
}

#[tokio::test]
async fn price_button_renders_the_quote() {
    let (engine, _dir) = engine();

    let response = engine.handle(7, "Tester", labels::PRICE).await;
    let text = text_of(&response);

    assert!(text.contains("Buy: 61,500 IRR"));
    assert!(text.contains("Sell: 61,000 IRR"));
    assert!(text.contains("Gold-backed USD: 77,759 IRR"));
}

#[tokio::test]
async fn flow_input_without_a_session_is_treated_as_idle() {
    let (engine, _dir) = engine();

    // A confirm press with no session must not crash or open anything.
    let response = engine.handle(7, "Tester", labels::CONFIRM).await;

    assert!(text_of(&response).contains("menu"));
    assert!(engine.sessions.get(7).is_none());
}

#[tokio::test]
async fn price_interrupt_discards_the_session_from_mid_flow() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    // Park the user deep in a buy flow, then interrupt.
    drive(&engine, 7, &[labels::BUY, "2000000"]).await;
    assert!(engine.sessions.get(7).is_some());

    let response = engine.handle(7, "Tester", labels::PRICE).await;

    assert!(text_of(&response).contains("Buy: 61,500 IRR"));
    assert!(engine.sessions.get(7).is_none());

    // Re-entering buy starts a brand-new session with no residual fields.
    let fresh = engine.handle(7, "Tester", labels::BUY).await;
    assert!(text_of(&fresh).contains("Send the amount"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyAmount { price: dec!(61500) })
    );
}

#[tokio::test]
async fn cancel_returns_to_idle_from_any_state() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    drive(&engine, 7, &[labels::BUY, "2000000", labels::CONFIRM]).await;
    let response = engine.handle(7, "Tester", labels::CANCEL).await;

    assert!(text_of(&response).contains("cancelled"));
    assert!(engine.sessions.get(7).is_none());
}

// -------------------------------------------------------------------------
// Verification
// -------------------------------------------------------------------------

#[tokio::test]
async fn unverified_buy_starts_the_challenge() {
    let (engine, _dir) = engine();

    let response = engine.handle(7, "Tester", labels::BUY).await;

    assert!(text_of(&response).contains("subscribe code"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingSubscribeCode {
            service: crate::domain::OrderKind::Buy
        })
    );
}

#[tokio::test]
async fn invalid_code_reprompts_in_the_same_state() {
    let (engine, _dir) = engine();

    let response = drive(&engine, 7, &[labels::BUY, "WRONG"]).await;

    assert!(text_of(&response).contains("not valid"));
    assert!(matches!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingSubscribeCode { .. })
    ));
}

#[tokio::test]
async fn malformed_national_id_reprompts() {
    let (engine, _dir) = engine();

    let response = drive(&engine, 7, &[labels::BUY, "GOLD1", "12345"]).await;

    assert!(text_of(&response).contains("10 digits"));
    assert!(matches!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingNationalId { .. })
    ));
}

#[tokio::test]
async fn mismatched_national_id_reprompts() {
    let (engine, _dir) = engine();

    let response = drive(&engine, 7, &[labels::BUY, "GOLD1", "9999999999"]).await;

    assert!(text_of(&response).contains("does not match"));
    assert!(!engine.auth.authorize(7));
}

#[tokio::test]
async fn full_challenge_enters_the_buy_flow() {
    let (engine, _dir) = engine();

    let response = drive(&engine, 7, &[labels::BUY, "GOLD1", "1234567890"]).await;
    let text = text_of(&response);

    assert!(text.contains("Verified"));
    assert!(text.contains("Send the amount"));
    assert!(engine.auth.authorize(7));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyAmount { price: dec!(61500) })
    );
}

// -------------------------------------------------------------------------
// Buy branch
// -------------------------------------------------------------------------

#[tokio::test]
async fn buy_amount_computes_the_token_amount() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = drive(&engine, 7, &[labels::BUY, "2000000"]).await;

    // 2,000,000 / 61,500 rounded to two decimals.
    assert!(text_of(&response).contains("32.52 USDT"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyConfirm {
            price: dec!(61500),
            amount: dec!(2000000),
            token_amount: dec!(32.52),
        })
    );
}

#[tokio::test]
async fn buy_amount_below_the_floor_keeps_the_state() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = drive(&engine, 7, &[labels::BUY, "999999"]).await;

    assert!(text_of(&response).contains("minimum buy amount"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyAmount { price: dec!(61500) })
    );
}

#[tokio::test]
async fn non_numeric_buy_amount_keeps_the_state() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = drive(&engine, 7, &[labels::BUY, "a lot"]).await;

    assert!(text_of(&response).contains("plain number"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyAmount { price: dec!(61500) })
    );
}

#[tokio::test]
async fn garbage_at_the_confirm_screen_reprompts() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = drive(&engine, 7, &[labels::BUY, "2000000", "maybe"]).await;

    assert!(text_of(&response).contains("confirm or cancel"));
    assert!(matches!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyConfirm { .. })
    ));
}

#[tokio::test]
async fn every_network_fee_is_subtracted() {
    for (i, network) in Network::ALL.into_iter().enumerate() {
        let (engine, _dir) = engine();
        let user = 100 + i as i64;
        engine.auth.grant(user, "GOLD1");

        drive(&engine, user, &[labels::BUY, "2000000", labels::CONFIRM]).await;
        engine.handle(user, "Tester", network.label()).await;

        let expected = dec!(32.52) - network.fee();
        assert_eq!(
            engine.sessions.get(user),
            Some(SessionState::AwaitingBuyWallet {
                network,
                amount: dec!(2000000),
                final_token_amount: expected,
            }),
            "fee mismatch for {network}"
        );
    }
}

#[tokio::test]
async fn fee_exceeding_the_token_amount_reprompts() {
    // At 100,000,000 IRR/USDT the minimum order buys 0.01 USDT, below any fee.
    let (engine, _dir) =
        engine_with(PriceQuote::compose(dec!(100000000), dec!(4500000), dec!(2400)));
    engine.auth.grant(7, "GOLD1");

    let response = drive(
        &engine,
        7,
        &[labels::BUY, "1000000", labels::CONFIRM, "BEP20"],
    )
    .await;

    assert!(text_of(&response).contains("fee exceeds"));
    assert!(matches!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingBuyNetwork { .. })
    ));
}

#[tokio::test]
async fn buy_end_to_end_matches_the_worked_example() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let preview = drive(&engine, 7, &[labels::BUY, "2000000", labels::CONFIRM, "TRC20"]).await;
    assert!(text_of(&preview).contains("27.52 USDT"));

    let done = engine.handle(7, "Tester", "TWalletXyz").await;
    let text = text_of(&done);

    assert!(text.contains("Buy order #2001"));
    assert!(text.contains("27.52 USDT via TRC20"));
    assert!(text.contains("TWalletXyz"));

    // Tracking code: local date+time, then the user id.
    let tracking_line = text
        .lines()
        .find(|l| l.starts_with("Tracking code: "))
        .unwrap();
    let code = tracking_line.trim_start_matches("Tracking code: ");
    let (stamp, user) = code.split_once('-').unwrap();
    assert_eq!(stamp.len(), 14);
    assert!(stamp.bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(user, "7");

    let note = done.operator_note.unwrap();
    assert!(note.contains("buy order #2001"));
    assert!(note.contains("Tester (7)"));
    assert!(note.contains("TWalletXyz"));

    assert!(engine.sessions.get(7).is_none());
}

#[tokio::test]
async fn consecutive_orders_get_consecutive_numbers() {
    let (engine, _dir) = engine();

    for (user, expected) in [(1_i64, "#2001"), (2, "#2002")] {
        engine.auth.grant(user, "GOLD1");
        let done = drive(
            &engine,
            user,
            &[labels::BUY, "2000000", labels::CONFIRM, "TRC20", "TWallet"],
        )
        .await;
        assert!(text_of(&done).contains(expected));
    }
}

// -------------------------------------------------------------------------
// Sell branch
// -------------------------------------------------------------------------

#[tokio::test]
async fn sell_quotes_the_spread_price() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = engine.handle(7, "Tester", labels::SELL).await;

    assert!(text_of(&response).contains("61,000 IRR"));
    assert_eq!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingSellAmount {
            sell_price: dec!(61000)
        })
    );
}

#[tokio::test]
async fn sell_below_one_token_reprompts() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let response = drive(&engine, 7, &[labels::SELL, "0.5"]).await;

    assert!(text_of(&response).contains("minimum sell amount"));
    assert!(matches!(
        engine.sessions.get(7),
        Some(SessionState::AwaitingSellAmount { .. })
    ));
}

#[tokio::test]
async fn sell_end_to_end_collects_banking_details() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    let preview = drive(&engine, 7, &[labels::SELL, "30"]).await;
    assert!(text_of(&preview).contains("1,830,000 IRR"));

    let done = drive(
        &engine,
        7,
        &[
            labels::CONFIRM,
            "TRC20",
            labels::SKIP,
            "12345678",
            "ir062000000000001234567890",
            "Ali Tester",
        ],
    )
    .await;
    let text = text_of(&done);

    assert!(text.contains("Sell order #1001"));
    assert!(text.contains("30 USDT via TRC20"));
    assert!(text.contains("TDeskDeposit"));

    let note = done.operator_note.unwrap();
    assert!(note.contains("Card: -"));
    assert!(note.contains("Account: 12345678"));
    assert!(note.contains("SHEBA: IR062000000000001234567890"));
    assert!(note.contains("Holder: Ali Tester"));

    assert!(engine.sessions.get(7).is_none());
}

#[tokio::test]
async fn sell_without_a_deposit_wallet_aborts_the_order() {
    let (engine, _dir) = engine();
    engine.auth.grant(7, "GOLD1");

    // BEP20 has no configured deposit address in the test ledger.
    let done = drive(
        &engine,
        7,
        &[
            labels::SELL,
            "30",
            labels::CONFIRM,
            "BEP20",
            labels::SKIP,
            labels::SKIP,
            labels::SKIP,
            "Ali Tester",
        ],
    )
    .await;

    assert!(text_of(&done).contains("contact support"));
    assert!(done.operator_note.is_none());
    assert!(engine.sessions.get(7).is_none());

    // The aborted order consumed no counter number.
    engine.ledger.set_wallet(Network::Bep20, "0xDeposit").unwrap();
    engine.auth.grant(8, "GOLD1");
    let ok = drive(
        &engine,
        8,
        &[
            labels::SELL,
            "30",
            labels::CONFIRM,
            "BEP20",
            labels::SKIP,
            labels::SKIP,
            labels::SKIP,
            "Sara Tester",
        ],
    )
    .await;
    assert!(text_of(&ok).contains("Sell order #1001"));
}

// -------------------------------------------------------------------------
// Quote degradation at entry
// -------------------------------------------------------------------------

#[tokio::test]
async fn flow_entry_is_refused_without_a_spot_price() {
    let (engine, _dir) = engine_with(PriceQuote::default());
    engine.auth.grant(7, "GOLD1");

    let response = engine.handle(7, "Tester", labels::BUY).await;

    assert!(text_of(&response).contains("unavailable"));
    assert!(engine.sessions.get(7).is_none());
}
