mod event;
mod outcome;

use alloy::{
    hex,
    primitives::{Address, TxHash},
};

pub use event::*;
pub use outcome::*;

/// Instant in chain history an event was emitted at.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct BlockInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl BlockInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }
}

/// Entity id of an account: `0x`-prefixed lower-case hex.
///
/// Ids are compared by exact string match, so every module has to go
/// through this function instead of the checksummed `Display` form.
pub fn account_id(address: &Address) -> String {
    hex::encode_prefixed(address.as_slice())
}

/// `0x`-prefixed lower-case hex of a transaction hash.
pub fn tx_hash_hex(hash: &TxHash) -> String {
    hex::encode_prefixed(hash.as_slice())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;

    #[test]
    fn test_account_id_is_lower_case() {
        let addr = address!("0xdF5B718d8FcC173335185a2a1513eE8151e3c027");
        assert_eq!(
            account_id(&addr),
            "0xdf5b718d8fcc173335185a2a1513ee8151e3c027"
        );
    }

    #[test]
    fn test_tx_hash_hex() {
        let hash = b256!("0x00000000000000000000000000000000000000000000000000000000000000aB");
        assert_eq!(
            tx_hash_hex(&hash),
            "0x00000000000000000000000000000000000000000000000000000000000000ab"
        );
    }
}
