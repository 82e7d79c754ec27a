//! Reducers of the perpetual trading contract, one per contract generation.
//!
//! The generations share event names but not their formulas. Each one is a
//! separate [`crate::reducer::Reducer`] holding its own position and trade
//! math; only handlers whose effect never changed between generations
//! (product/vault admin, reward distribution, liquidation payouts, vault
//! staking) live in `common`.

mod common;
pub mod v1;
pub mod v2;
pub mod v3;
pub mod v4;
pub mod v5;

pub use v1::PerpV1;
pub use v2::PerpV2;
pub use v3::PerpV3;
pub use v4::PerpV4;
pub use v5::PerpV5;

/// Fixed-point scale of prices and leverage.
pub const UNIT: u64 = 100_000_000;

/// Basis of fees and liquidation thresholds.
pub const FEE_BASIS: u64 = 10_000;

/// Liquidation threshold of generations without a per-product one.
pub const LEGACY_LIQUIDATION_THRESHOLD: u64 = 8_000;
