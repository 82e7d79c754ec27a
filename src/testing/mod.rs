//! Test utilities: event context fixtures and store seeding.
//!
//! [`Feed`] hands out [`EventContext`]s the way the chain would: log indices
//! increase within a block and reset when the feed moves to a later block.
//!
//! [`seed_market`] writes a vault and a product directly to a store, for
//! tests that are not about the admin events creating them.

use alloy::primitives::{Address, B256, I256, TxHash, U256, address};

use crate::{
    entity::{Product, Vault},
    num,
    perp::UNIT,
    store::Store,
    types::{BlockInstant, EventContext},
};

pub const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0x0000000000000000000000000000000000000b0b");
pub const LIQUIDATOR: Address = address!("0x000000000000000000000000000000000000dead");

/// 2023-06-01T00:00:00Z.
pub const GENESIS_TIMESTAMP: u64 = 1_685_577_600;

pub fn u(value: u64) -> U256 {
    U256::from(value)
}

/// `value` scaled to the protocol's 8-decimal fixed point.
pub fn e8(value: u64) -> U256 {
    U256::from(value) * U256::from(UNIT)
}

pub fn i(value: i64) -> I256 {
    I256::try_from(value).unwrap()
}

/// Deterministic transaction hash of the `n`-th transaction in `block`.
pub fn tx_hash(block: u64, n: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[16..24].copy_from_slice(&block.to_be_bytes());
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    B256::from(bytes)
}

/// Source of event contexts in chain order, one transaction per event.
#[derive(Clone, Debug)]
pub struct Feed {
    instant: BlockInstant,
    log_index: u64,
}

impl Feed {
    pub fn new(block_number: u64, timestamp: u64) -> Self {
        Self {
            instant: BlockInstant::new(block_number, timestamp),
            log_index: 0,
        }
    }

    /// Feed starting at block 1, [`GENESIS_TIMESTAMP`].
    pub fn genesis() -> Self {
        Self::new(1, GENESIS_TIMESTAMP)
    }

    pub fn instant(&self) -> BlockInstant {
        self.instant
    }

    pub fn timestamp(&self) -> u64 {
        self.instant.block_timestamp()
    }

    /// Moves to the next block, `seconds` later.
    pub fn advance(&mut self, seconds: u64) -> &mut Self {
        self.instant = BlockInstant::new(
            self.instant.block_number() + 1,
            self.instant.block_timestamp() + seconds,
        );
        self.log_index = 0;
        self
    }

    pub fn next<T>(&mut self, event: T) -> EventContext<T> {
        let ctx = EventContext::new(
            self.instant,
            tx_hash(self.instant.block_number(), self.log_index),
            self.log_index,
            event,
        );
        self.log_index += 1;
        ctx
    }
}

/// Writes the vault and a product with the given fee and liquidation
/// threshold (basis points).
pub fn seed_market<S: Store>(
    store: &mut S,
    instant: BlockInstant,
    product_id: u64,
    fee: u64,
    liquidation_threshold: u64,
) {
    if store.load::<Vault>(crate::entity::VAULT_ID).is_none() {
        store.save(Vault::new(instant));
    }
    let mut product = Product::new(product_id.to_string(), instant);
    product.fee = num::small(fee);
    product.liquidation_threshold = num::small(liquidation_threshold);
    product.max_leverage = num::small(50 * UNIT);
    store.save(product);
}
