use alloy::primitives::TxHash;

use super::BlockInstant;

/// Events from a specific block.
#[derive(Debug)]
pub struct BlockEvents<T> {
    instant: BlockInstant,
    events: Vec<T>,
}

/// Decoded event along with its block and transaction context.
#[derive(Clone, Debug)]
pub struct EventContext<T> {
    pub(crate) instant: BlockInstant,
    pub(crate) tx_hash: TxHash,
    pub(crate) log_index: u64,
    pub(crate) event: T,
}

impl<T> BlockEvents<T> {
    pub fn new(instant: BlockInstant, events: Vec<T>) -> Self {
        Self { instant, events }
    }

    /// Instant the events were produced at.
    pub fn instant(&self) -> BlockInstant {
        self.instant
    }

    /// Events in log order.
    pub fn events(&self) -> &[T] {
        &self.events
    }

    pub fn into_events(self) -> Vec<T> {
        self.events
    }
}

impl<T> EventContext<T> {
    pub fn new(instant: BlockInstant, tx_hash: TxHash, log_index: u64, event: T) -> Self {
        Self {
            instant,
            tx_hash,
            log_index,
            event,
        }
    }

    pub fn instant(&self) -> BlockInstant {
        self.instant
    }

    pub fn block_number(&self) -> u64 {
        self.instant.block_number()
    }

    pub fn timestamp(&self) -> u64 {
        self.instant.block_timestamp()
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    pub fn event(&self) -> &T {
        &self.event
    }

    /// Same context carrying another payload.
    pub fn pass<O>(&self, other: O) -> EventContext<O> {
        EventContext {
            instant: self.instant,
            tx_hash: self.tx_hash,
            log_index: self.log_index,
            event: other,
        }
    }
}
