//! Amount type
//!
//! Domain primitive for transaction amounts. An `Amount` can only be built
//! from a strictly positive decimal within the storable range, so an invalid
//! amount never reaches the store.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Largest single transaction amount (1 trillion)
const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000;

/// Maximum decimal places, matching the `NUMERIC(28, 8)` columns
pub const MAX_SCALE: u32 = 8;

/// Total digits of the `NUMERIC(28, 8)` balance column
const BALANCE_PRECISION: u32 = 28;

/// Largest single transaction amount
pub fn max_amount() -> Decimal {
    Decimal::from(MAX_AMOUNT_UNITS)
}

/// Largest balance the store can hold (just under 10^20)
pub fn max_balance() -> Decimal {
    Decimal::from_i128_with_scale(10_i128.pow(BALANCE_PRECISION) - 1, MAX_SCALE)
}

/// Amount represents a validated, strictly positive monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - At most 8 decimal places
/// - At most 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use ledger_service::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(100, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(100, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

/// Errors that can occur when creating or crediting an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT_UNITS})")]
    Overflow,

    #[error("Resulting balance exceeds the maximum storable value")]
    BalanceOverflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// Trailing zeros do not count towards the scale limit.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > max_amount() {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Balance after crediting this amount to `balance`.
    ///
    /// # Errors
    /// - `AmountError::BalanceOverflow` if the sum is past `max_balance()`
    pub fn credit(&self, balance: Decimal) -> Result<Decimal, AmountError> {
        balance
            .checked_add(self.0)
            .filter(|total| *total <= max_balance())
            .ok_or(AmountError::BalanceOverflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}
