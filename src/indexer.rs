//! Dispatch of decoded events to the reducer of the contract that emitted them.

use alloy::{
    primitives::Log,
    sol_types::{self, SolEventInterface},
};
use tracing::{debug, info};

use crate::{
    Contract,
    abi::{
        fee_reward::VaultFeeReward::VaultFeeRewardEvents,
        order_book::OrderBook::OrderBookEvents,
        perp_v1::PikaPerpV1::PikaPerpV1Events,
        perp_v2::PikaPerpV2::PikaPerpV2Events,
        perp_v3::PikaPerpV3::PikaPerpV3Events,
        perp_v4::PikaPerpV4::PikaPerpV4Events,
        perp_v5::PikaPerpV5::PikaPerpV5Events,
        position_manager::PositionManager::PositionManagerEvents,
        staking::PikaStaking::PikaStakingEvents,
        user_mapping::UserMapping::UserMappingEvents,
    },
    config::IndexerConfig,
    error::IndexerError,
    fee_reward::FeeReward,
    orders::{MarketOrders, TriggerOrders},
    perp::{PerpV1, PerpV2, PerpV3, PerpV4, PerpV5},
    proxy::UserMapping,
    reducer::Reducer,
    staking::{StakingV1, StakingV2},
    store::Store,
    types::{BlockEvents, BlockInstant, EventContext, Outcome},
};

/// Decoded event of any indexed contract.
#[derive(Debug)]
pub enum SourceEvent {
    PerpV1(PikaPerpV1Events),
    PerpV2(PikaPerpV2Events),
    PerpV3(PikaPerpV3Events),
    PerpV4(PikaPerpV4Events),
    PerpV5(PikaPerpV5Events),
    FeeReward(VaultFeeRewardEvents),
    StakingV1(PikaStakingEvents),
    StakingV2(PikaStakingEvents),
    OrderBook(OrderBookEvents),
    PositionManager(PositionManagerEvents),
    UserMapping(UserMappingEvents),
}

pub type SourceBlockEvents = BlockEvents<EventContext<SourceEvent>>;

impl SourceEvent {
    /// Decodes a log emitted by `contract`.
    ///
    /// Returns `None` for events the contract emits but nothing is derived
    /// from (ownership transfers, token approvals and the like).
    pub fn decode(contract: Contract, log: &Log) -> Result<Option<Self>, IndexerError> {
        fn decode<E: SolEventInterface>(
            log: &Log,
            wrap: fn(E) -> SourceEvent,
        ) -> Result<Option<SourceEvent>, IndexerError> {
            match E::decode_log(log) {
                Ok(decoded) => Ok(Some(wrap(decoded.data))),
                // Topic matches none of the events declared in the interface
                Err(sol_types::Error::InvalidLog { .. } | sol_types::Error::UnknownSelector { .. }) => {
                    Ok(None)
                }
                Err(err) => Err(err.into()),
            }
        }

        match contract {
            Contract::PerpV1 => decode(log, Self::PerpV1),
            Contract::PerpV2 => decode(log, Self::PerpV2),
            Contract::PerpV3 => decode(log, Self::PerpV3),
            Contract::PerpV4 => decode(log, Self::PerpV4),
            Contract::PerpV5 => decode(log, Self::PerpV5),
            Contract::FeeReward => decode(log, Self::FeeReward),
            Contract::StakingV1 => decode(log, Self::StakingV1),
            Contract::StakingV2 => decode(log, Self::StakingV2),
            Contract::OrderBook => decode(log, Self::OrderBook),
            Contract::PositionManager => decode(log, Self::PositionManager),
            Contract::UserMapping => decode(log, Self::UserMapping),
        }
    }
}

/// Outcome counts of one applied block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockSummary {
    pub instant: BlockInstant,
    pub applied: usize,
    pub ignored: usize,
    pub skipped: usize,
}

impl BlockSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Applied => self.applied += 1,
            Outcome::Ignored(_) => self.ignored += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Every reducer of the protocol, configured once and fed events in chain
/// order.
#[derive(Clone, Debug)]
pub struct Indexer {
    perp_v1: PerpV1,
    perp_v2: PerpV2,
    perp_v3: PerpV3,
    perp_v4: PerpV4,
    perp_v5: PerpV5,
    fee_reward: FeeReward,
    staking_v1: StakingV1,
    staking_v2: StakingV2,
    trigger_orders: TriggerOrders,
    market_orders: MarketOrders,
    user_mapping: UserMapping,
    instant: Option<BlockInstant>,
    // Block number and count of events committed from a block that failed midway
    partial: Option<(u64, usize)>,
}

impl Indexer {
    pub fn new(config: &IndexerConfig) -> Self {
        Self {
            perp_v1: PerpV1,
            perp_v2: PerpV2::new(config.v2_user_window()),
            perp_v3: PerpV3::new(config.v3_user_window()),
            perp_v4: PerpV4::new(config.epoch_start),
            perp_v5: PerpV5::new(config.epoch_start),
            fee_reward: FeeReward,
            staking_v1: StakingV1::new(config.staking_window()),
            staking_v2: StakingV2,
            trigger_orders: TriggerOrders,
            market_orders: MarketOrders,
            user_mapping: UserMapping,
            instant: None,
            partial: None,
        }
    }

    /// Last block applied with [`Self::apply_block`].
    pub fn instant(&self) -> Option<BlockInstant> {
        self.instant
    }

    /// Reduces a single event, committing its writes when applied.
    pub fn apply<S: Store>(
        &self,
        store: &mut S,
        event: EventContext<SourceEvent>,
    ) -> Result<Outcome, IndexerError> {
        let EventContext {
            instant,
            tx_hash,
            log_index,
            event,
        } = event;
        let ctx = EventContext::new(instant, tx_hash, log_index, ());
        match event {
            SourceEvent::PerpV1(e) => self.perp_v1.apply(store, &ctx.pass(e)),
            SourceEvent::PerpV2(e) => self.perp_v2.apply(store, &ctx.pass(e)),
            SourceEvent::PerpV3(e) => self.perp_v3.apply(store, &ctx.pass(e)),
            SourceEvent::PerpV4(e) => self.perp_v4.apply(store, &ctx.pass(e)),
            SourceEvent::PerpV5(e) => self.perp_v5.apply(store, &ctx.pass(e)),
            SourceEvent::FeeReward(e) => self.fee_reward.apply(store, &ctx.pass(e)),
            SourceEvent::StakingV1(e) => self.staking_v1.apply(store, &ctx.pass(e)),
            SourceEvent::StakingV2(e) => self.staking_v2.apply(store, &ctx.pass(e)),
            SourceEvent::OrderBook(e) => self.trigger_orders.apply(store, &ctx.pass(e)),
            SourceEvent::PositionManager(e) => self.market_orders.apply(store, &ctx.pass(e)),
            SourceEvent::UserMapping(e) => self.user_mapping.apply(store, &ctx.pass(e)),
        }
    }

    /// Applies the events of the next block in log order.
    ///
    /// Returns `None` if the block was already applied. Blocks have to be
    /// contiguous once the first one was applied.
    ///
    /// Every event is committed on its own. When one fails, the events before
    /// it stay committed and the block is not marked applied; passing the same
    /// block again resumes at the failed event, and the summary then counts
    /// only the resumed events.
    pub fn apply_block<S: Store>(
        &mut self,
        store: &mut S,
        block: SourceBlockEvents,
    ) -> Result<Option<BlockSummary>, IndexerError> {
        let next = block.instant();
        if let Some(last) = self.instant {
            if last.block_number() >= next.block_number() {
                return Ok(None);
            }
            if last.block_number() + 1 < next.block_number() {
                return Err(IndexerError::BlockOutOfOrder(
                    last.block_number() + 1,
                    next.block_number(),
                ));
            }
        }

        let mut summary = BlockSummary {
            instant: next,
            ..Default::default()
        };
        let resume_at = match self.partial {
            Some((block_num, committed)) if block_num == next.block_number() => committed,
            _ => 0,
        };
        for (idx, event) in block.into_events().into_iter().enumerate().skip(resume_at) {
            match self.apply(store, event) {
                Ok(outcome) => summary.record(&outcome),
                Err(err) => {
                    self.partial = Some((next.block_number(), idx));
                    return Err(err);
                }
            }
        }
        self.instant = Some(next);
        self.partial = None;

        if summary.skipped > 0 {
            info!(block = next.block_number(), ?summary, "block applied with skipped events");
        } else {
            debug!(block = next.block_number(), ?summary, "block applied");
        }
        Ok(Some(summary))
    }
}
