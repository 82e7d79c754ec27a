use alloy::primitives::{Address, I256};

use crate::types::BlockInstant;

/// Market configuration plus its running trading statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Product {
    pub id: String,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
    pub updated_at_timestamp: u64,
    pub updated_at_block_number: u64,

    pub product_token: Address,
    pub max_leverage: I256,
    /// Trading fee in basis points.
    pub fee: I256,
    pub is_active: bool,
    pub min_price_change: I256,
    pub weight: I256,
    pub reserve: I256,
    /// Liquidation threshold in basis points, zero for generations that
    /// hardcode it.
    pub liquidation_threshold: I256,

    /// Never negative.
    pub open_interest_long: I256,
    /// Never negative.
    pub open_interest_short: I256,

    pub cumulative_pnl: I256,
    pub cumulative_volume: I256,
    pub cumulative_margin: I256,
    pub position_count: u64,
    pub trade_count: u64,
}

impl Product {
    pub fn new(id: String, instant: BlockInstant) -> Self {
        Self {
            id,
            created_at_timestamp: instant.block_timestamp(),
            created_at_block_number: instant.block_number(),
            is_active: true,
            ..Default::default()
        }
    }

    pub fn open_interest_mut(&mut self, is_long: bool) -> &mut I256 {
        if is_long {
            &mut self.open_interest_long
        } else {
            &mut self.open_interest_short
        }
    }
}
