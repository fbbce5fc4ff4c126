//! # Money Module
//!
//! Provides the `Amount` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    (1.005).toFixed(2) = "1.00" or "1.01" depending on the artifact      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Every quantity, price, discount and tax percent is a Decimal.        │
//! │    Intermediate math carries 10 fractional digits; display rounds       │
//! │    to 2 with round-half-even (bankers rounding).                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use facture_core::money::Amount;
//!
//! let price = Amount::parse("10.99");      // exact, no float round-trip
//! let total = price * Amount::parse("3");
//! assert_eq!(total.display(), "32.97");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::{DISPLAY_SCALE, INTERNAL_SCALE};

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary (or quantity) value backed by `rust_decimal::Decimal`.
///
/// ## Design Decisions
/// - **Newtype over Decimal**: keeps the rounding policy in one place
/// - **Zero-on-invalid**: parsing garbage yields zero, per the amount
///   computation policy (the same garbage is separately reported by
///   validation at save time)
/// - **Round-half-even**: all rounding uses bankers rounding
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(Decimal::ZERO)
    }

    /// Wraps a raw decimal.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Amount(value)
    }

    /// Parses a decimal string, yielding zero for anything unparsable.
    ///
    /// ## Why Not An Error?
    /// Amount computation treats invalid operands as zero so that a
    /// half-filled invoice form still shows a running total. Validation
    /// reports the invalid field separately when the invoice is saved.
    pub fn parse(s: &str) -> Self {
        Decimal::from_str(s.trim()).map(Amount).unwrap_or_default()
    }

    /// Converts an optional decimal field, treating `None` as zero.
    ///
    /// Used for draft discount/tax/shipping fields where the UI may not
    /// have supplied a value yet.
    #[inline]
    pub fn from_option(value: Option<Decimal>) -> Self {
        Amount(value.unwrap_or(Decimal::ZERO))
    }

    /// Returns the underlying decimal value.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiplies two amounts, rounding the product to the internal scale.
    ///
    /// Quantity × unit price can produce more fractional digits than we
    /// carry (e.g. 0.333 × 0.333); the product is rounded half-even to
    /// [`INTERNAL_SCALE`] digits so downstream sums stay canonical.
    pub fn mul_rounded(&self, other: Amount) -> Amount {
        Amount(
            (self.0 * other.0)
                .round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Applies a percentage (e.g. tax percent 8.25 → × 0.0825).
    pub fn percent_of(&self, percent: Amount) -> Amount {
        let rate = percent.0 / Decimal::from(100);
        Amount(
            (self.0 * rate)
                .round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Clamps negative values to zero.
    pub fn clamp_negative(&self) -> Amount {
        if self.is_negative() {
            Amount::zero()
        } else {
            *self
        }
    }

    /// Rounds to display precision (2 digits, half-even).
    pub fn round_display(&self) -> Amount {
        Amount(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Renders a fixed 2-decimal string with thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use facture_core::money::Amount;
    ///
    /// assert_eq!(Amount::parse("1234567.891").display(), "1,234,567.89");
    /// assert_eq!(Amount::parse("1.005").display(), "1.00"); // half-even
    /// ```
    pub fn display(&self) -> String {
        let rounded = self.round_display().0;
        let raw = format!("{:.prec$}", rounded, prec = DISPLAY_SCALE as usize);

        let (number, fraction) = match raw.split_once('.') {
            Some((n, f)) => (n, f),
            None => (raw.as_str(), ""),
        };
        let (sign, digits) = match number.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", number),
        };

        // Group the integer digits in threes from the right.
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        format!("{}{}.{}", sign, grouped, fraction)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the raw decimal value. Use [`Amount::display`] for the
/// user-facing 2-decimal form.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Amount(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, other: Self) -> Self {
        Amount(self.0 * other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
