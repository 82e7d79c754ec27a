//! Fixed-point integer helpers shared by the reducers.
//!
//! Every stored amount is an [`I256`], mirroring the arbitrary precision
//! signed integers the protocol's own accounting is reported in. Division is
//! truncating (towards zero), matching the contracts' fixed-point math.

use alloy::primitives::{I256, Sign, U256};
use fastnum::{
    D256, bint,
    decimal::{Context, Decimal, RoundingMode},
};

use crate::error::IndexerError;

/// Converts a raw `uint256` event field into a signed amount.
pub fn int(value: U256) -> Result<I256, IndexerError> {
    I256::try_from(value).map_err(|_| IndexerError::Overflow("uint256 -> int256"))
}

/// Signed amount from a small unsigned value (counters, basis points, timestamps).
pub fn small(value: u64) -> I256 {
    I256::from_raw(U256::from(value))
}

/// Truncating division, failing on zero divisor.
pub fn div(numerator: I256, denominator: I256, what: &'static str) -> Result<I256, IndexerError> {
    if denominator.is_zero() {
        return Err(IndexerError::DivisionByZero(what));
    }
    numerator
        .checked_div(denominator)
        .ok_or(IndexerError::Overflow(what))
}

/// Product failing with [`IndexerError::Overflow`] instead of wrapping.
pub fn mul(a: I256, b: I256, what: &'static str) -> Result<I256, IndexerError> {
    a.checked_mul(b).ok_or(IndexerError::Overflow(what))
}

/// Sum failing with [`IndexerError::Overflow`] instead of wrapping.
pub fn add(a: I256, b: I256, what: &'static str) -> Result<I256, IndexerError> {
    a.checked_add(b).ok_or(IndexerError::Overflow(what))
}

/// Difference failing with [`IndexerError::Overflow`] instead of wrapping.
pub fn sub(a: I256, b: I256, what: &'static str) -> Result<I256, IndexerError> {
    a.checked_sub(b).ok_or(IndexerError::Overflow(what))
}

/// Magnitude of `value`; `I256::MIN` has none.
pub fn abs(value: I256, what: &'static str) -> Result<I256, IndexerError> {
    value.checked_abs().ok_or(IndexerError::Overflow(what))
}

/// Notional size of `margin` at `leverage`, both scaled by `unit`.
pub fn notional(margin: I256, leverage: I256, unit: u64) -> Result<I256, IndexerError> {
    div(mul(margin, leverage, "notional size")?, small(unit), "notional size")
}

/// Price at which a position opened at `price` with `leverage` gets liquidated,
/// given the liquidation threshold in basis points.
///
/// `price ∓ price * threshold * 10000 / leverage`, leverage being scaled by 10^8.
pub fn liquidation_price(
    price: I256,
    leverage: I256,
    is_long: bool,
    threshold: I256,
) -> Result<I256, IndexerError> {
    const WHAT: &str = "liquidation price";
    let scaled = mul(mul(price, threshold, WHAT)?, small(10_000), WHAT)?;
    let offset = div(scaled, leverage, WHAT)?;
    if is_long {
        sub(price, offset, WHAT)
    } else {
        add(price, offset, WHAT)
    }
}

/// `value - delta`, floored at zero.
pub fn sub_floor(value: I256, delta: I256) -> I256 {
    let res = value.saturating_sub(delta);
    if res.is_negative() { I256::ZERO } else { res }
}

/// Fixed-point to decimal converter, used to render amounts for humans.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    pub fn to_decimal(&self, value: I256) -> D256 {
        let unscaled = bint::UInt::<4>::from_le_slice(value.unsigned_abs().as_le_slice())
            .expect("Converter: abs(I256) -> UInt::<4>");
        Decimal::<4>::from_parts(
            unscaled,
            -self.decimals,
            match value.sign() {
                Sign::Negative => fastnum::decimal::Sign::Minus,
                Sign::Positive => fastnum::decimal::Sign::Plus,
            },
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }
}
