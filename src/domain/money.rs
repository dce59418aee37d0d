//! Monetary types for price and amount representation.

use rust_decimal::Decimal;

/// Iranian rial amount represented as a Decimal for precision.
pub type Rial = Decimal;

/// Token (USDT) amount represented as a Decimal for precision.
pub type Tokens = Decimal;
