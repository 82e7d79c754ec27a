//! Vault fee reward contract: claims and reinvestments credited to users.

use alloy::primitives::{Address, U256};

use crate::{
    abi::fee_reward::VaultFeeReward::VaultFeeRewardEvents,
    entity::User,
    error::IndexerError,
    num,
    reducer::Reducer,
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Fee rewards are paid in a token with 6 decimals, user amounts use 8.
const REWARD_SCALE: u64 = 100;

#[derive(Clone, Copy, Debug, Default)]
pub struct FeeReward;

impl Reducer for FeeReward {
    type Event = VaultFeeRewardEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            VaultFeeRewardEvents::ClaimedReward(e) => credit(batch, &e.user, e.amount),
            VaultFeeRewardEvents::Reinvested(e) => credit(batch, &e.user, e.amount),
        }
    }
}

fn credit<S: Store>(
    batch: &mut Batch<'_, S>,
    user: &Address,
    amount: U256,
) -> Result<Outcome, IndexerError> {
    let Some(mut user) = batch.load::<User>(&types::account_id(user)) else {
        return Ok(Outcome::Ignored("unknown user"));
    };
    user.reward += num::mul(num::int(amount)?, num::small(REWARD_SCALE), "fee reward")?;
    user.refresh_net_amount();
    batch.save(user);
    Ok(Outcome::Applied)
}
