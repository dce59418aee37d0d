//! Composite price quote assembled from independent upstream sources.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// One composite price reading.
///
/// Zero is the explicit "unavailable" sentinel for any field whose upstream
/// fetch failed; consumers must treat a zero field as missing, never as a
/// real price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceQuote {
    /// USDT buy price in IRR.
    pub buy: Decimal,
    /// 18-karat gold price in IRR per gram.
    pub gold_18k: Decimal,
    /// International gold ounce price in USD.
    pub ounce_usd: Decimal,
    /// Gold-backed USD/IRR cross rate derived from the two gold readings.
    pub usd_rate: Decimal,
}

impl PriceQuote {
    /// Assemble a quote from the three raw source readings.
    ///
    /// The cross rate is computed only when both gold inputs are non-zero:
    /// pure-gold IRR per gram over pure-gold USD per gram, using the
    /// troy-ounce constant 31.1035 and the 18k purity constant 0.75.
    pub fn compose(buy: Decimal, gold_18k: Decimal, ounce_usd: Decimal) -> Self {
        let usd_rate = if gold_18k > Decimal::ZERO && ounce_usd > Decimal::ZERO {
            (gold_18k * dec!(31.1035) / (dec!(0.75) * ounce_usd)).round_dp(0)
        } else {
            Decimal::ZERO
        };

        Self {
            buy,
            gold_18k,
            ounce_usd,
            usd_rate,
        }
    }

    /// Sell price quoted to users: buy price minus the desk spread.
    pub fn sell_price(&self, spread: Decimal) -> Decimal {
        if self.buy <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.buy - spread).max(Decimal::ZERO)
    }

    /// Whether the spot leg is usable for opening an order.
    pub fn has_spot(&self) -> bool {
        self.buy > Decimal::ZERO
    }
}
