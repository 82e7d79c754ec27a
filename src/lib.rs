//! Pika perpetual protocol indexer.
//!
//! # Overview
//!
//! Derives protocol state (vault totals, products, positions, trades, user
//! statistics, orders, staking balances) from the events of every contract
//! generation the protocol deployed.
//!
//! Each contract has its own [`reducer::Reducer`]; [`indexer::Indexer`]
//! dispatches decoded events to them and commits the derived entities to a
//! [`store::Store`]. Use [`stream::logs`] to poll and decode the events of a
//! [`Deployment`] block by block.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Reductions assume events arrive in block, transaction and log order;
//!   nothing is reordered.
//!
//! * Chain reorganizations are not handled, the stream should start from a
//!   finalized block.
//!
//! # Testing
//!
//! [`testing`] module provides event fixtures for driving the reducers
//! against a [`store::MemoryStore`].

pub mod abi;
pub mod bucket;
pub mod config;
pub mod entity;
pub mod error;
pub mod fee_reward;
pub mod indexer;
pub mod num;
pub mod orders;
pub mod perp;
pub mod proxy;
pub mod reducer;
pub mod staking;
pub mod store;
pub mod stream;
pub mod testing;
pub mod types;

use alloy::primitives::Address;

/// Role of an indexed contract, selecting the ABI its logs are decoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contract {
    PerpV1,
    PerpV2,
    PerpV3,
    PerpV4,
    PerpV5,
    FeeReward,
    StakingV1,
    StakingV2,
    OrderBook,
    PositionManager,
    UserMapping,
}

/// Contracts of one protocol deployment.
#[derive(Clone, Debug, Default)]
pub struct Deployment {
    contracts: Vec<(Address, Contract)>,
    deployed_at_block: u64,
}

impl Deployment {
    pub fn new(deployed_at_block: u64) -> Self {
        Self {
            contracts: vec![],
            deployed_at_block,
        }
    }

    /// Adds a contract, replacing the role of an already known address.
    pub fn with(mut self, address: Address, contract: Contract) -> Self {
        self.contracts.retain(|(a, _)| *a != address);
        self.contracts.push((address, contract));
        self
    }

    /// Role of the contract at `address`, if indexed.
    pub fn contract_at(&self, address: Address) -> Option<Contract> {
        self.contracts
            .iter()
            .find_map(|(a, c)| (*a == address).then_some(*c))
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.contracts.iter().map(|(a, _)| *a).collect()
    }

    pub fn deployed_at_block(&self) -> u64 {
        self.deployed_at_block
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
