//! Reducers of the auxiliary staking contract.
//!
//! The first generation only counted a fixed campaign; the second one tracks
//! every stake. Both keep one [`Staker`] balance per account.

use alloy::primitives::{Address, U256};

use crate::{
    abi::staking::PikaStaking::PikaStakingEvents,
    config::TimeWindow,
    entity::Staker,
    error::IndexerError,
    num,
    reducer::Reducer,
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Reducer of the first staking generation, limited to a campaign window.
#[derive(Clone, Copy, Debug)]
pub struct StakingV1 {
    window: TimeWindow,
}

/// Reducer of the second staking generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StakingV2;

impl StakingV1 {
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }
}

impl Reducer for StakingV1 {
    type Event = PikaStakingEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        if !self.window.contains(event.timestamp()) {
            return Ok(Outcome::Ignored("outside staking campaign"));
        }
        reduce_staking(batch, event.event())
    }
}

impl Reducer for StakingV2 {
    type Event = PikaStakingEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        reduce_staking(batch, event.event())
    }
}

fn reduce_staking<S: Store>(
    batch: &mut Batch<'_, S>,
    event: &PikaStakingEvents,
) -> Result<Outcome, IndexerError> {
    match event {
        PikaStakingEvents::Staked(e) => staked(batch, &e.user, e.amount),
        PikaStakingEvents::Withdrawn(e) => withdrawn(batch, &e.user, e.amount, e.fee),
    }
}

fn staked<S: Store>(
    batch: &mut Batch<'_, S>,
    user: &Address,
    amount: U256,
) -> Result<Outcome, IndexerError> {
    let id = types::account_id(user);
    let mut staker = batch.load::<Staker>(&id).unwrap_or_else(|| Staker {
        id,
        ..Default::default()
    });
    staker.amount += num::int(amount)?;
    batch.save(staker);
    Ok(Outcome::Applied)
}

fn withdrawn<S: Store>(
    batch: &mut Batch<'_, S>,
    user: &Address,
    amount: U256,
    fee: U256,
) -> Result<Outcome, IndexerError> {
    let Some(mut staker) = batch.load::<Staker>(&types::account_id(user)) else {
        return Ok(Outcome::Ignored("unknown staker"));
    };
    staker.amount -= num::int(amount)? + num::int(fee)?;
    batch.save(staker);
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, address};

    use super::*;
    use crate::{
        abi::staking::PikaStaking,
        store::MemoryStore,
        types::BlockInstant,
    };

    const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");

    fn staked_at(ts: u64, amount: u64) -> EventContext<PikaStakingEvents> {
        let event = PikaStakingEvents::Staked(PikaStaking::Staked {
            user: ALICE,
            amount: U256::from(amount),
        });
        EventContext::new(BlockInstant::new(1, ts), Default::default(), 0, event)
    }

    fn withdrawn_at(ts: u64, amount: u64, fee: u64) -> EventContext<PikaStakingEvents> {
        let event = PikaStakingEvents::Withdrawn(PikaStaking::Withdrawn {
            user: ALICE,
            amount: U256::from(amount),
            fee: U256::from(fee),
        });
        EventContext::new(BlockInstant::new(2, ts), Default::default(), 0, event)
    }

    fn balance(store: &MemoryStore) -> Option<i64> {
        store
            .load::<Staker>(&types::account_id(&ALICE))
            .map(|s| i64::try_from(s.amount).unwrap())
    }

    #[test]
    fn test_window_gates_first_generation() {
        let staking = StakingV1::new(TimeWindow::new(100, 200));
        let mut store = MemoryStore::new();

        let outcome = staking.apply(&mut store, &staked_at(99, 10)).unwrap();
        assert!(matches!(outcome, Outcome::Ignored(_)));
        assert_eq!(balance(&store), None);

        assert!(staking.apply(&mut store, &staked_at(100, 10)).unwrap().is_applied());
        assert!(!staking.apply(&mut store, &staked_at(200, 10)).unwrap().is_applied());
        assert_eq!(balance(&store), Some(10));
    }

    #[test]
    fn test_withdrawal_subtracts_fee() {
        let mut store = MemoryStore::new();
        StakingV2.apply(&mut store, &staked_at(1, 100)).unwrap();
        StakingV2.apply(&mut store, &withdrawn_at(2, 40, 2)).unwrap();
        assert_eq!(balance(&store), Some(58));
    }

    #[test]
    fn test_unknown_staker_withdrawal_is_ignored() {
        let mut store = MemoryStore::new();
        let outcome = StakingV2.apply(&mut store, &withdrawn_at(2, 40, 2)).unwrap();
        assert_eq!(outcome, Outcome::Ignored("unknown staker"));
        assert!(store.is_empty());
    }
}
