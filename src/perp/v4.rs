//! Fourth generation.
//!
//! Liquidation thresholds become a product parameter and rollups gain an
//! epoch granularity. `NewPosition` reports the fill price; the entry price
//! of an increased position is blended harmonically. Volumes and open
//! interest only grow by the size actually added.

use alloy::primitives::I256;

use crate::{
    abi::perp_v4::PikaPerpV4::{self, PikaPerpV4Events},
    bucket,
    entity::{Position, Product, VAULT_ID, Vault},
    error::IndexerError,
    num,
    perp::{
        FEE_BASIS, UNIT,
        common::{self, CloseFill, OpenFill, ProductParams, Reward, ShareTime},
    },
    reducer::{Reducer, require},
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// 360-day year of this generation's funding math.
pub const YEAR_SECONDS: u64 = 31_104_000;

const ADDED_MARGIN: &str = "Added margin";

/// Reducer of the fourth perpetual contract generation.
#[derive(Clone, Copy, Debug)]
pub struct PerpV4 {
    epoch_start: u64,
}

impl From<&PikaPerpV4::Product> for ProductParams {
    fn from(p: &PikaPerpV4::Product) -> Self {
        Self {
            product_token: p.productToken,
            max_leverage: p.maxLeverage,
            fee: p.fee,
            is_active: p.isActive,
            min_price_change: p.minPriceChange,
            weight: p.weight,
            reserve: p.reserve,
            liquidation_threshold: Some(p.liquidationThreshold),
        }
    }
}

impl Reducer for PerpV4 {
    type Event = PikaPerpV4Events;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            PikaPerpV4Events::ProductAdded(e) => {
                common::product_added(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV4Events::ProductUpdated(e) => {
                common::product_updated(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV4Events::VaultUpdated(e) => {
                common::vault_updated(batch, event, e.vault.cap, e.vault.stakingPeriod)
            }
            PikaPerpV4Events::NewPosition(e) => self.new_position(batch, event, e),
            PikaPerpV4Events::AddMargin(e) => self.add_margin(batch, event, e),
            PikaPerpV4Events::ClosePosition(e) => self.close_position(batch, event, e),
            PikaPerpV4Events::PositionLiquidated(e) => common::position_liquidated(
                batch,
                event,
                e.positionId,
                e.liquidator,
                e.liquidatorReward,
                e.remainingReward,
                Some(self.epoch_start),
            ),
            PikaPerpV4Events::Staked(e) => {
                common::staked(batch, event, e.user, e.amount, e.shares, ShareTime::Tracked)
            }
            PikaPerpV4Events::Redeemed(e) => common::redeemed(
                batch,
                event,
                e.user,
                e.amount,
                e.shares,
                e.shareBalance,
                e.isFullRedeem,
                ShareTime::Tracked,
            ),
            PikaPerpV4Events::ProtocolRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Protocol, e.amount)
            }
            PikaPerpV4Events::PikaRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Pika, e.amount)
            }
            PikaPerpV4Events::VaultRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Vault, e.amount)
            }
            PikaPerpV4Events::OwnerUpdated(_) => Ok(Outcome::Ignored("owner update")),
        }
    }
}

impl PerpV4 {
    /// Epoch rollups count 30-day periods from `epoch_start`.
    pub fn new(epoch_start: u64) -> Self {
        Self { epoch_start }
    }

    fn new_position<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV4::NewPosition,
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
            funding_rate: e.fundingRate,
        };

        let existing = batch.load::<Position>(&fill.position_key());
        let created = existing.is_none();
        let (mut position, single_amount, single_margin) = match existing {
            Some(mut position) => {
                let added = fill.amount - position.amount;
                let single_margin = fill.margin - position.margin;
                const WHAT: &str = "average entry price";
                position.price = num::div(
                    num::mul(num::mul(fill.amount, position.price, WHAT)?, fill.price, WHAT)?,
                    num::add(
                        num::mul(position.amount, fill.price, WHAT)?,
                        num::mul(added, position.price, WHAT)?,
                        WHAT,
                    )?,
                    WHAT,
                )?;
                (position, added, single_margin)
            }
            None => (fill.new_position(ctx), fill.amount, fill.margin),
        };
        fill.write_to(ctx, &mut position, product.liquidation_threshold)?;

        let opened = u64::from(created);
        vault.cumulative_volume += single_amount;
        vault.cumulative_margin += single_margin;
        vault.cumulative_fee += fill.fee;
        vault.position_count += opened;
        vault.tx_count += 1;

        let mut day = bucket::day_data(batch, ctx.timestamp());
        let mut epoch = bucket::epoch_data(batch, ctx.timestamp(), self.epoch_start);
        for totals in [&mut day.totals, &mut epoch.totals] {
            totals.cumulative_volume += single_amount;
            totals.cumulative_margin += single_margin;
            totals.cumulative_fee += fill.fee;
            totals.position_count += opened;
            totals.tx_count += 1;
        }

        product.cumulative_volume += single_amount;
        product.cumulative_margin += single_margin;
        product.position_count += opened;
        *product.open_interest_mut(fill.is_long) += single_amount;

        let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
        user.volume += single_amount;
        user.fees += num::div(
            num::mul(single_amount, product.fee, "user fees")?,
            num::small(FEE_BASIS),
            "user fees",
        )?;

        batch.save(fill.transaction(ctx, vault.tx_count, single_amount, single_margin, fill.price));
        batch.save(position);
        batch.save(user);
        batch.save(vault);
        batch.save(day);
        batch.save(epoch);
        batch.save(product);
        Ok(Outcome::Applied)
    }

    fn add_margin<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV4::AddMargin,
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
            product.liquidation_threshold,
        )?;
        position.updated_at_timestamp = ctx.timestamp();
        position.updated_at_block_number = ctx.block_number();

        vault.cumulative_margin += margin;
        let mut day = bucket::day_data(batch, ctx.timestamp());
        day.totals.cumulative_margin += margin;
        let mut epoch = bucket::epoch_data(batch, ctx.timestamp(), self.epoch_start);
        epoch.totals.cumulative_margin += margin;
        product.cumulative_margin += margin;

        batch.save(common::margin_activity(ctx, &position, ADDED_MARGIN, margin));
        batch.save(position);
        batch.save(vault);
        batch.save(day);
        batch.save(epoch);
        batch.save(product);
        Ok(Outcome::Applied)
    }

    fn close_position<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV4::ClosePosition,
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
            funding_payment: e.fundingPayment,
            was_liquidated: e.wasLiquidated,
        };

        vault.trade_count += 1;
        vault.tx_count += 1;
        let transaction = fill.transaction(ctx, vault.tx_count, &position);
        let trade = fill.trade(ctx, vault.trade_count, &position, fill.pnl.is_negative())?;

        if fill.was_liquidated {
            batch.save(common::liquidated_activity(
                ctx,
                &fill.owner,
                &position,
                fill.margin,
                fill.amount,
                fill.price,
            ));
        }

        let pnl = num::abs(fill.pnl, "pnl")?;
        vault.cumulative_volume += fill.amount;
        vault.cumulative_margin += fill.margin;
        vault.cumulative_fee += transaction.trade_fee;
        vault.cumulative_pnl += pnl;
        vault.balance += vault_credit(&fill, &position);

        let mut day = bucket::day_data(batch, ctx.timestamp());
        let mut epoch = bucket::epoch_data(batch, ctx.timestamp(), self.epoch_start);
        for totals in [&mut day.totals, &mut epoch.totals] {
            totals.cumulative_volume += fill.amount;
            totals.cumulative_margin += fill.margin;
            totals.cumulative_fee += transaction.trade_fee;
            totals.cumulative_pnl += pnl;
            totals.trade_count += 1;
            totals.tx_count += 1;
        }

        product.cumulative_volume += fill.amount;
        product.cumulative_margin += fill.margin;
        product.cumulative_pnl += pnl;
        product.trade_count += 1;
        let open_interest = product.open_interest_mut(position.is_long);
        *open_interest = num::sub_floor(*open_interest, fill.amount);

        let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
        user.volume += fill.amount;
        if !fill.was_liquidated {
            user.fees += fill.fee;
        }
        user.pnl += fill.pnl;

        let threshold = product.liquidation_threshold;
        fill.settle(batch, ctx, &mut vault, &mut product, position, threshold)?;

        batch.save(transaction);
        batch.save(trade);
        batch.save(user);
        batch.save(vault);
        batch.save(day);
        batch.save(epoch);
        batch.save(product);
        Ok(Outcome::Applied)
    }
}

/// Signed change of the vault balance caused by a close.
///
/// The vault takes the opposite side of the trader's PnL, except that a
/// liquidated position can never cost its owner more than its margin.
pub(super) fn vault_credit(fill: &CloseFill, position: &Position) -> I256 {
    let loss = -fill.pnl;
    if fill.was_liquidated && loss > position.margin {
        position.margin
    } else {
        loss
    }
}
