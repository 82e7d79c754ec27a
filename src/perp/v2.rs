//! Second generation: adds oracle prices and reward distribution, trader
//! statistics optionally gated by a campaign window.

use alloy::primitives::I256;

use crate::{
    abi::perp_v2::PikaPerpV2::{self, PikaPerpV2Events},
    bucket,
    config::TimeWindow,
    entity::{Position, Product, VAULT_ID, Vault},
    error::IndexerError,
    num,
    perp::{
        FEE_BASIS, LEGACY_LIQUIDATION_THRESHOLD, UNIT,
        common::{self, CloseFill, OpenFill, ProductParams, Reward, ShareTime},
    },
    reducer::{Reducer, require},
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

pub const YEAR_SECONDS: u64 = 31_536_000;

/// Reducer of the second perpetual contract generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerpV2 {
    user_window: Option<TimeWindow>,
}

impl From<&PikaPerpV2::Product> for ProductParams {
    fn from(p: &PikaPerpV2::Product) -> Self {
        Self {
            product_token: p.productToken,
            max_leverage: p.maxLeverage,
            fee: p.fee,
            is_active: p.isActive,
            min_price_change: p.minPriceChange,
            weight: p.weight,
            reserve: p.reserve,
            liquidation_threshold: None,
        }
    }
}

impl Reducer for PerpV2 {
    type Event = PikaPerpV2Events;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            PikaPerpV2Events::ProductAdded(e) => {
                common::product_added(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV2Events::ProductUpdated(e) => {
                common::product_updated(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV2Events::VaultUpdated(e) => {
                common::vault_updated(batch, event, e.vault.cap, e.vault.stakingPeriod)
            }
            PikaPerpV2Events::NewPosition(e) => self.new_position(batch, event, e),
            PikaPerpV2Events::AddMargin(e) => self.add_margin(batch, event, e),
            PikaPerpV2Events::ClosePosition(e) => self.close_position(batch, event, e),
            PikaPerpV2Events::PositionLiquidated(e) => common::position_liquidated(
                batch,
                event,
                e.positionId,
                e.liquidator,
                e.liquidatorReward,
                e.remainingReward,
                None,
            ),
            PikaPerpV2Events::Staked(e) => {
                common::staked(batch, event, e.user, e.amount, e.shares, ShareTime::Untracked)
            }
            PikaPerpV2Events::Redeemed(e) => common::redeemed(
                batch,
                event,
                e.user,
                e.amount,
                e.shares,
                e.shareBalance,
                e.isFullRedeem,
                ShareTime::Untracked,
            ),
            PikaPerpV2Events::ProtocolRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Protocol, e.amount)
            }
            PikaPerpV2Events::PikaRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Pika, e.amount)
            }
            PikaPerpV2Events::VaultRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Vault, e.amount)
            }
            PikaPerpV2Events::OwnerUpdated(_) => Ok(Outcome::Ignored("owner update")),
        }
    }
}

impl PerpV2 {
    /// Trader statistics only count positions touched within `user_window`,
    /// when given.
    pub fn new(user_window: Option<TimeWindow>) -> Self {
        Self { user_window }
    }

    fn tracks_user(&self, timestamp: u64) -> bool {
        self.user_window.is_none_or(|w| w.contains(timestamp))
    }

    fn new_position<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV2::NewPosition,
    ) -> Result<Outcome, IndexerError> {
        let mut vault = require!(batch, Vault, VAULT_ID);
        let mut product = require!(batch, Product, e.productId.to_string());

        let margin = num::int(e.margin)?;
        let leverage = num::int(e.leverage)?;
        let fill = OpenFill {
            position_id: num::int(e.positionId)?,
            owner: types::account_id(&e.user),
            product_id: num::int(e.productId)?,
            is_long: e.isLong,
            price: num::int(e.price)?,
            oracle_price: num::int(e.oraclePrice)?,
            margin,
            leverage,
            amount: num::notional(margin, leverage, UNIT)?,
            fee: num::int(e.fee)?,
            funding_rate: I256::ZERO,
        };

        let (mut position, single_amount, single_margin) =
            match batch.load::<Position>(&fill.position_key()) {
                Some(mut position) => {
                    let added = fill.amount - position.amount;
                    let single_margin = fill.margin - position.margin;
                    const WHAT: &str = "average entry price";
                    position.price = num::div(
                        num::add(
                            num::mul(position.price, position.amount, WHAT)?,
                            num::mul(fill.price, added, WHAT)?,
                            WHAT,
                        )?,
                        fill.amount,
                        WHAT,
                    )?;
                    (position, added, single_margin)
                }
                None => (fill.new_position(ctx), fill.amount, fill.margin),
            };
        fill.write_to(
            ctx,
            &mut position,
            num::small(LEGACY_LIQUIDATION_THRESHOLD),
        )?;

        vault.cumulative_volume += single_amount;
        vault.cumulative_margin += fill.margin;
        vault.position_count += 1;
        vault.tx_count += 1;

        let mut day = bucket::day_data(batch, ctx.timestamp());
        day.totals.cumulative_volume += single_amount;
        day.totals.cumulative_margin += single_margin;
        day.totals.cumulative_fee += fill.fee;
        day.totals.position_count += 1;
        day.totals.tx_count += 1;

        product.cumulative_volume += fill.amount;
        product.cumulative_margin += fill.margin;
        product.position_count += 1;
        *product.open_interest_mut(fill.is_long) += fill.amount;

        if self.tracks_user(ctx.timestamp()) {
            let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
            user.volume += single_amount;
            user.fees += num::div(
                num::mul(single_amount, product.fee, "user fees")?,
                num::small(FEE_BASIS),
                "user fees",
            )?;
            batch.save(user);
        }

        batch.save(fill.transaction(ctx, vault.tx_count, single_amount, single_margin, fill.price));
        batch.save(position);
        batch.save(vault);
        batch.save(day);
        batch.save(product);
        Ok(Outcome::Applied)
    }

    fn add_margin<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV2::AddMargin,
    ) -> Result<Outcome, IndexerError> {
        let mut position = require!(batch, Position, e.positionId.to_string());
        let mut vault = require!(batch, Vault, VAULT_ID);
        let mut product = require!(batch, Product, position.product_id.to_string());
        let margin = num::int(e.margin)?;

        position.margin = num::int(e.newMargin)?;
        position.leverage = num::int(e.newLeverage)?;
        position.liquidation_price = num::liquidation_price(
            position.price,
            position.leverage,
            position.is_long,
            num::small(LEGACY_LIQUIDATION_THRESHOLD),
        )?;
        position.updated_at_timestamp = ctx.timestamp();
        position.updated_at_block_number = ctx.block_number();

        vault.cumulative_margin += margin;
        let mut day = bucket::day_data(batch, ctx.timestamp());
        day.totals.cumulative_margin += margin;
        product.cumulative_margin += margin;

        batch.save(position);
        batch.save(vault);
        batch.save(day);
        batch.save(product);
        Ok(Outcome::Applied)
    }

    fn close_position<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV2::ClosePosition,
    ) -> Result<Outcome, IndexerError> {
        let position = require!(batch, Position, e.positionId.to_string());
        let mut vault = require!(batch, Vault, VAULT_ID);
        let mut product = require!(batch, Product, e.productId.to_string());

        let margin = num::int(e.margin)?;
        let leverage = num::int(e.leverage)?;
        let fill = CloseFill {
            position_id: num::int(e.positionId)?,
            owner: types::account_id(&e.user),
            product_id: num::int(e.productId)?,
            price: num::int(e.price)?,
            entry_price: num::int(e.entryPrice)?,
            margin,
            leverage,
            amount: num::notional(margin, leverage, UNIT)?,
            fee: num::int(e.fee)?,
            pnl: e.pnl,
            funding_payment: I256::ZERO,
            was_liquidated: e.wasLiquidated,
        };

        vault.trade_count += 1;
        vault.tx_count += 1;
        let transaction = fill.transaction(ctx, vault.tx_count, &position);
        let trade = fill.trade(ctx, vault.trade_count, &position, fill.pnl.is_negative())?;

        let pnl = num::abs(fill.pnl, "pnl")?;
        vault.cumulative_volume += fill.amount;
        vault.cumulative_margin += fill.margin;
        vault.cumulative_pnl += pnl;
        vault.balance -= fill.pnl;

        let mut day = bucket::day_data(batch, ctx.timestamp());
        day.totals.cumulative_volume += fill.amount;
        day.totals.cumulative_margin += fill.margin;
        day.totals.cumulative_fee += transaction.trade_fee;
        day.totals.cumulative_pnl += pnl;
        day.totals.trade_count += 1;
        day.totals.tx_count += 1;

        product.cumulative_volume += fill.amount;
        product.cumulative_margin += fill.margin;
        product.cumulative_pnl += pnl;
        product.trade_count += 1;
        let open_interest = product.open_interest_mut(position.is_long);
        *open_interest = num::sub_floor(*open_interest, fill.amount);

        if self.tracks_user(ctx.timestamp()) {
            let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
            user.volume += fill.amount;
            if !fill.was_liquidated {
                user.fees += fill.fee;
            }
            user.pnl += fill.pnl;
            batch.save(user);
        }

        fill.settle(
            batch,
            ctx,
            &mut vault,
            &mut product,
            position,
            num::small(LEGACY_LIQUIDATION_THRESHOLD),
        )?;

        batch.save(transaction);
        batch.save(trade);
        batch.save(vault);
        batch.save(day);
        batch.save(product);
        Ok(Outcome::Applied)
    }
}
