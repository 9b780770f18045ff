//! Decimal-to-integer scaling.
//!
//! The solver operates on integers only, so decimal inputs are multiplied by
//! `s = 10^precision` before they reach a variable or constraint. Three kinds of
//! values are distinguished, and each has a matching inverse so that results
//! are rescaled symmetrically:
//!
//! - **quantities** (production amounts, plan values, allocation bounds) scale by `s`
//! - **rates** (resource per unit, cost per unit) scale by `s`
//! - **capacities** (resource totals, cost totals), being quantity × rate, scale by `s²`
//!
//! # Examples
//!
//! ```
//! use prodalloc_core::Precision;
//! use rust_decimal::Decimal;
//!
//! let p = Precision::new(2).unwrap();
//! let scaled = p.scale_quantity(Decimal::new(1250, 2)).unwrap(); // 12.50
//! assert_eq!(scaled, 1250);
//! assert_eq!(p.unscale_quantity(scaled), Decimal::new(1250, 2));
//! assert_eq!(p.scale_capacity(Decimal::from(3)).unwrap(), 30_000);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ScaleError;

/// Largest supported precision; `10^(2 * 9)` still fits in an i64.
pub const MAX_PRECISION: u32 = 9;

/// Number of decimal digits preserved when converting inputs to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Precision {
    digits: u32,
}

impl Precision {
    /// Integer-only inputs, no scaling.
    pub const ZERO: Precision = Precision { digits: 0 };

    /// Creates a precision of `digits` decimal places.
    pub fn new(digits: u32) -> Result<Self, ScaleError> {
        if digits > MAX_PRECISION {
            return Err(ScaleError::PrecisionTooLarge(digits));
        }
        Ok(Self { digits })
    }

    #[inline]
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Returns `s = 10^digits`.
    #[inline]
    pub fn factor(&self) -> i64 {
        10_i64.pow(self.digits)
    }

    /// Returns `s² = 10^(2 * digits)`.
    #[inline]
    pub fn capacity_factor(&self) -> i64 {
        10_i64.pow(2 * self.digits)
    }

    /// Scales a production quantity by `s`.
    pub fn scale_quantity(&self, value: Decimal) -> Result<i64, ScaleError> {
        scale_decimal(value, self.digits)
    }

    /// Scales a per-unit rate by `s`.
    pub fn scale_rate(&self, value: Decimal) -> Result<i64, ScaleError> {
        scale_decimal(value, self.digits)
    }

    /// Scales a capacity or cost total by `s²`.
    pub fn scale_capacity(&self, value: Decimal) -> Result<i64, ScaleError> {
        scale_decimal(value, 2 * self.digits)
    }

    /// Scales an integral quantity (e.g. a configured bound) by `s`.
    pub fn scale_int_quantity(&self, value: i64) -> Result<i64, ScaleError> {
        scale_int(value, self.digits)
    }

    /// Scales an integral capacity (e.g. a configured cost bound) by `s²`.
    pub fn scale_int_capacity(&self, value: i64) -> Result<i64, ScaleError> {
        scale_int(value, 2 * self.digits)
    }

    /// Inverse of [`scale_quantity`](Self::scale_quantity).
    pub fn unscale_quantity(&self, value: i64) -> Decimal {
        Decimal::new(value, self.digits).normalize()
    }

    /// Inverse of [`scale_capacity`](Self::scale_capacity).
    pub fn unscale_capacity(&self, value: i64) -> Decimal {
        Decimal::new(value, 2 * self.digits).normalize()
    }
}

fn scale_decimal(value: Decimal, exponent: u32) -> Result<i64, ScaleError> {
    let factor = Decimal::from(10_i64.pow(exponent));
    let scaled = value
        .checked_mul(factor)
        .ok_or(ScaleError::Overflow { value, exponent })?;
    if !scaled.fract().is_zero() {
        return Err(ScaleError::NotIntegral { value, exponent });
    }
    scaled.to_i64().ok_or(ScaleError::Overflow { value, exponent })
}

fn scale_int(value: i64, exponent: u32) -> Result<i64, ScaleError> {
    value
        .checked_mul(10_i64.pow(exponent))
        .ok_or(ScaleError::Overflow {
            value: Decimal::from(value),
            exponent,
        })
}
