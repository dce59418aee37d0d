//! Message formatting for every user-visible and operator-visible text.

use rust_decimal::Decimal;

use crate::domain::{Network, OrderKind, PriceQuote, UserId};

/// Render a decimal with thousands separators, e.g. `1234567.89` → `1,234,567.89`.
pub(crate) fn group_digits(value: Decimal) -> String {
    let plain = value.normalize().to_string();
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn price_line(value: Decimal, unit: &str) -> String {
    if value > Decimal::ZERO {
        format!("{} {unit}", group_digits(value))
    } else {
        "unavailable".to_string()
    }
}

/// The public quote message, shared by the price button and the channel
/// broadcaster.
pub fn quote_message(quote: &PriceQuote, spread: Decimal) -> String {
    format!(
        "💵 Tether (USDT) Quote\n\
        \n\
        Buy: {}\n\
        Sell: {}\n\
        Gold 18k: {}\n\
        Gold ounce: {}\n\
        Gold-backed USD: {}",
        price_line(quote.buy, "IRR"),
        price_line(quote.sell_price(spread), "IRR"),
        price_line(quote.gold_18k, "IRR/g"),
        price_line(quote.ounce_usd, "USD"),
        price_line(quote.usd_rate, "IRR"),
    )
}

pub fn greeting(display_name: &str) -> String {
    let name = if display_name.is_empty() {
        "there"
    } else {
        display_name
    };
    format!(
        "👋 Hello {name}!\n\
        \n\
        I quote the Tether price and take buy/sell orders.\n\
        Pick an option from the menu below."
    )
}

pub fn menu_hint() -> String {
    "Please pick an option from the menu below.".to_string()
}

pub fn cancelled() -> String {
    "❌ Order cancelled. You are back at the main menu.".to_string()
}

pub fn quote_unavailable() -> String {
    "⚠️ Quoting is unavailable right now. Please try again in a moment.".to_string()
}

pub fn ledger_failure() -> String {
    "⚠️ We could not register your order. Please try again or contact support.".to_string()
}

// -----------------------------------------------------------------------------
// Verification
// -----------------------------------------------------------------------------

pub fn subscribe_code_prompt(service: OrderKind) -> String {
    let verb = match service {
        OrderKind::Buy => "buy",
        OrderKind::Sell => "sell",
    };
    format!(
        "🔐 To {verb} you need to verify first.\n\
        Send your subscribe code."
    )
}

pub fn code_invalid() -> String {
    "❌ That subscribe code is not valid. Send an active subscribe code.".to_string()
}

pub fn national_id_prompt() -> String {
    "Code accepted. Now send your 10-digit national ID.".to_string()
}

pub fn national_id_format_error() -> String {
    "The national ID must be exactly 10 digits. Try again.".to_string()
}

pub fn national_id_mismatch() -> String {
    "❌ That ID does not match this subscribe code. Try again.".to_string()
}

pub fn verified_notice() -> String {
    "✅ Verified. You can place orders for the next 15 minutes.".to_string()
}

// -----------------------------------------------------------------------------
// Buy flow
// -----------------------------------------------------------------------------

pub fn buy_amount_prompt(price: Decimal) -> String {
    format!(
        "Current buy rate: {} IRR per USDT.\n\
        \n\
        Send the amount you want to spend, in IRR (minimum 1,000,000).",
        group_digits(price)
    )
}

pub fn amount_not_numeric() -> String {
    "Send the amount as a plain number.".to_string()
}

pub fn buy_amount_below_floor() -> String {
    "The minimum buy amount is 1,000,000 IRR. Send a larger amount.".to_string()
}

pub fn buy_confirm_screen(price: Decimal, amount: Decimal, token_amount: Decimal) -> String {
    format!(
        "🧾 Buy Order Preview\n\
        \n\
        You pay: {} IRR\n\
        Rate: {} IRR/USDT\n\
        You receive: {} USDT (before network fee)\n\
        \n\
        Confirm to continue.",
        group_digits(amount),
        group_digits(price),
        group_digits(token_amount),
    )
}

pub fn confirm_hint() -> String {
    "Please confirm or cancel the order.".to_string()
}

pub fn network_prompt() -> String {
    let fees = Network::ALL
        .map(|n| format!("{} {}", n.label(), n.fee()))
        .join(" / ");
    format!(
        "Select the transfer network.\n\
        Network fees (USDT): {fees}"
    )
}

pub fn network_fee_too_high(network: Network) -> String {
    format!(
        "The {network} fee exceeds your token amount. Pick another network or cancel."
    )
}

pub fn wallet_prompt(network: Network, final_token_amount: Decimal) -> String {
    format!(
        "You will receive {} USDT on {network} after the network fee.\n\
        \n\
        Send your {network} wallet address.",
        group_digits(final_token_amount),
    )
}

pub fn wallet_address_required() -> String {
    "Send the destination wallet address as text.".to_string()
}

pub fn buy_registered(
    order_no: u64,
    tracking: &str,
    amount: Decimal,
    final_token_amount: Decimal,
    network: Network,
    address: &str,
) -> String {
    format!(
        "✅ Buy order #{order_no} registered\n\
        \n\
        Tracking code: {tracking}\n\
        You pay: {} IRR\n\
        You receive: {} USDT via {network}\n\
        Wallet: {address}\n\
        \n\
        An operator will contact you shortly.\n\
        This order is valid for 10 minutes.",
        group_digits(amount),
        group_digits(final_token_amount),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn buy_operator_note(
    display_name: &str,
    user_id: UserId,
    order_no: u64,
    tracking: &str,
    amount: Decimal,
    final_token_amount: Decimal,
    network: Network,
    address: &str,
) -> String {
    format!(
        "🔔 New buy order #{order_no}\n\
        User: {display_name} ({user_id})\n\
        Tracking: {tracking}\n\
        {} IRR → {} USDT via {network}\n\
        Wallet: {address}",
        group_digits(amount),
        group_digits(final_token_amount),
    )
}

// -----------------------------------------------------------------------------
// Sell flow
// -----------------------------------------------------------------------------

pub fn sell_amount_prompt(sell_price: Decimal) -> String {
    format!(
        "Current sell rate: {} IRR per USDT.\n\
        \n\
        Send the USDT amount you want to sell (minimum 1).",
        group_digits(sell_price)
    )
}

pub fn sell_amount_below_floor() -> String {
    "The minimum sell amount is 1 USDT. Send a larger amount.".to_string()
}

pub fn sell_confirm_screen(sell_price: Decimal, token_amount: Decimal, amount: Decimal) -> String {
    format!(
        "🧾 Sell Order Preview\n\
        \n\
        You send: {} USDT\n\
        Rate: {} IRR/USDT\n\
        You receive: {} IRR\n\
        \n\
        Confirm to continue.",
        group_digits(token_amount),
        group_digits(sell_price),
        group_digits(amount),
    )
}

pub fn card_number_prompt() -> String {
    "Send the bank card number for the payout, or skip.".to_string()
}

pub fn account_number_prompt() -> String {
    "Send the bank account number, or skip.".to_string()
}

pub fn sheba_prompt() -> String {
    "Send the SHEBA number, or skip.".to_string()
}

pub fn account_holder_prompt() -> String {
    "Send the account holder's full name.".to_string()
}

pub fn account_holder_required() -> String {
    "The account holder's name is required. Send it as text.".to_string()
}

pub fn wallet_unconfigured(network: Network) -> String {
    format!(
        "⚠️ No deposit address is configured for {network} right now.\n\
        Your order was not registered. Please contact support."
    )
}

pub fn sell_registered(
    order_no: u64,
    tracking: &str,
    token_amount: Decimal,
    amount: Decimal,
    network: Network,
    deposit_address: &str,
) -> String {
    format!(
        "✅ Sell order #{order_no} registered\n\
        \n\
        Tracking code: {tracking}\n\
        Send {} USDT via {network} to:\n\
        {deposit_address}\n\
        \n\
        You will receive {} IRR after the transfer is confirmed.\n\
        This order is valid for 10 minutes.",
        group_digits(token_amount),
        group_digits(amount),
    )
}

fn bank_field(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[allow(clippy::too_many_arguments)]
pub fn sell_operator_note(
    display_name: &str,
    user_id: UserId,
    order_no: u64,
    tracking: &str,
    token_amount: Decimal,
    amount: Decimal,
    network: Network,
    card: &str,
    account: &str,
    sheba: &str,
    holder: &str,
) -> String {
    format!(
        "🔔 New sell order #{order_no}\n\
        User: {display_name} ({user_id})\n\
        Tracking: {tracking}\n\
        {} USDT via {network} → {} IRR\n\
        Card: {}\n\
        Account: {}\n\
        SHEBA: {}\n\
        Holder: {holder}",
        group_digits(token_amount),
        group_digits(amount),
        bank_field(card),
        bank_field(account),
        bank_field(sheba),
    )
}
