use alloy::primitives::{I256, TxHash};

use crate::types;

/// Currently open leveraged position.
///
/// Exists only while its size is positive: a full close deletes it.
#[derive(Clone, derive_more::Debug, Default, PartialEq)]
pub struct Position {
    pub id: String,
    #[debug("{position_id}")]
    pub position_id: I256,
    pub owner: String,
    #[debug("{product_id}")]
    pub product_id: I256,
    pub is_long: bool,
    #[debug("{leverage}")]
    pub leverage: I256,
    /// Average entry price.
    #[debug("{price}")]
    pub price: I256,
    #[debug("{oracle_price}")]
    pub oracle_price: I256,
    #[debug("{margin}")]
    pub margin: I256,
    /// Notional size, `margin * leverage / UNIT`.
    #[debug("{amount}")]
    pub amount: I256,
    #[debug("{liquidation_price}")]
    pub liquidation_price: I256,
    #[debug("{funding}")]
    pub funding: I256,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
    pub updated_at_timestamp: u64,
    pub updated_at_block_number: u64,
}

/// Kind of position action a [`Transaction`] row records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxAction {
    Open = 0,
    Close = 1,
}

/// Append-only log row of one open or close action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub tx_hash: String,
    /// Value of the vault's running transaction counter for this row.
    pub count: u64,
    pub position_id: I256,
    pub owner: String,
    pub product_id: I256,
    pub is_long: bool,
    pub margin: I256,
    pub leverage: I256,
    pub amount: I256,
    /// Size delta this action contributed.
    pub single_amount: I256,
    /// Margin delta this action contributed.
    pub single_margin: I256,
    pub price: I256,
    pub trade_fee: I256,
    pub pnl: I256,
    pub was_liquidated: bool,
    pub timestamp: u64,
    pub block_number: u64,
}

impl Transaction {
    /// `positionId + txHash + runningTxCount + actionDigit`.
    pub fn make_id(position_id: I256, tx_hash: &TxHash, count: u64, action: TxAction) -> String {
        format!(
            "{}{}{}{}",
            position_id,
            types::tx_hash_hex(tx_hash),
            count,
            action as u8
        )
    }
}

/// Append-only row of a close or liquidation.
#[derive(Clone, derive_more::Debug, Default, PartialEq)]
pub struct Trade {
    pub id: String,
    pub tx_hash: String,
    #[debug("{position_id}")]
    pub position_id: I256,
    #[debug("{product_id}")]
    pub product_id: I256,
    pub owner: String,
    pub is_long: bool,
    #[debug("{leverage}")]
    pub leverage: I256,
    #[debug("{amount}")]
    pub amount: I256,
    #[debug("{margin}")]
    pub margin: I256,
    #[debug("{entry_price}")]
    pub entry_price: I256,
    #[debug("{close_price}")]
    pub close_price: I256,
    #[debug("{pnl}")]
    pub pnl: I256,
    pub pnl_is_negative: bool,
    pub was_liquidated: bool,
    pub is_full_close: bool,
    #[debug("{trade_fee}")]
    pub trade_fee: I256,
    #[debug("{funding_payment}")]
    pub funding_payment: I256,
    pub timestamp: u64,
    pub block_number: u64,
}

/// Append-only row of a liquidation payout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Liquidation {
    pub id: String,
    pub tx_hash: String,
    pub position_id: I256,
    pub liquidator: String,
    pub liquidator_reward: I256,
    pub remaining_reward: I256,
    pub timestamp: u64,
    pub block_number: u64,
}
