use alloy::primitives::I256;

use crate::types::BlockInstant;

/// Id of the protocol-wide vault singleton.
pub const VAULT_ID: &str = "1";

/// Protocol-wide vault economics.
///
/// `cumulative_*` fields are sums of magnitudes and never decrease, while
/// `balance` carries the signed cash effect of trading and staking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vault {
    pub id: String,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
    pub updated_at_timestamp: u64,
    pub updated_at_block_number: u64,

    pub cap: I256,
    pub staking_period: u64,

    pub balance: I256,
    pub staked: I256,
    pub shares: I256,

    pub cumulative_pnl: I256,
    pub cumulative_volume: I256,
    pub cumulative_margin: I256,
    pub cumulative_fee: I256,

    pub position_count: u64,
    pub trade_count: u64,
    pub tx_count: u64,
    pub user_count: u64,
    pub liquidation_count: u64,

    pub protocol_reward: I256,
    pub pika_reward: I256,
    pub vault_reward: I256,
}

impl Vault {
    pub fn new(instant: BlockInstant) -> Self {
        Self {
            id: VAULT_ID.to_string(),
            created_at_timestamp: instant.block_timestamp(),
            created_at_block_number: instant.block_number(),
            ..Default::default()
        }
    }

    /// Registers a first-seen user, returning its sequence number.
    pub fn next_user_number(&mut self) -> u64 {
        self.user_count += 1;
        self.user_count
    }
}

/// Running totals of a time-bucketed vault rollup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RollupTotals {
    pub cumulative_volume: I256,
    pub cumulative_margin: I256,
    pub cumulative_fee: I256,
    pub cumulative_pnl: I256,
    pub position_count: u64,
    pub trade_count: u64,
    pub tx_count: u64,
    pub liquidator_reward: I256,
    pub remaining_reward: I256,
}

/// Vault activity within one UTC day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultDayData {
    pub id: String,
    /// Timestamp of the day start.
    pub date: u64,
    pub totals: RollupTotals,
}

/// Vault activity within one 30-day epoch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultEpochData {
    pub id: String,
    pub epoch: u64,
    pub start_timestamp: u64,
    pub totals: RollupTotals,
}
