//! Third generation.
//!
//! `NewPosition` reports the already blended entry price, the fill price is
//! backed out of it. Accounting keeps this generation's historical
//! conventions: a zero PnL counts as negative, positive PnL is credited to
//! the vault balance when the position was liquidated, and product volume
//! and open interest grow by the full position size on every increase.

use alloy::primitives::I256;

use crate::{
    abi::perp_v3::PikaPerpV3::{self, PikaPerpV3Events},
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

const ADDED_MARGIN: &str = "Added margin";

/// Reducer of the third perpetual contract generation.
#[derive(Clone, Copy, Debug)]
pub struct PerpV3 {
    user_window: TimeWindow,
}

impl From<&PikaPerpV3::Product> for ProductParams {
    fn from(p: &PikaPerpV3::Product) -> Self {
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

impl Reducer for PerpV3 {
    type Event = PikaPerpV3Events;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            PikaPerpV3Events::ProductAdded(e) => {
                common::product_added(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV3Events::ProductUpdated(e) => {
                common::product_updated(batch, event, e.productId, (&e.product).into())
            }
            PikaPerpV3Events::VaultUpdated(e) => {
                common::vault_updated(batch, event, e.vault.cap, e.vault.stakingPeriod)
            }
            PikaPerpV3Events::NewPosition(e) => self.new_position(batch, event, e),
            PikaPerpV3Events::AddMargin(e) => self.add_margin(batch, event, e),
            PikaPerpV3Events::ClosePosition(e) => self.close_position(batch, event, e),
            PikaPerpV3Events::PositionLiquidated(e) => common::position_liquidated(
                batch,
                event,
                e.positionId,
                e.liquidator,
                e.liquidatorReward,
                e.remainingReward,
                None,
            ),
            PikaPerpV3Events::Staked(e) => {
                common::staked(batch, event, e.user, e.amount, e.shares, ShareTime::Untracked)
            }
            PikaPerpV3Events::Redeemed(e) => common::redeemed(
                batch,
                event,
                e.user,
                e.amount,
                e.shares,
                e.shareBalance,
                e.isFullRedeem,
                ShareTime::Untracked,
            ),
            PikaPerpV3Events::ProtocolRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Protocol, e.amount)
            }
            PikaPerpV3Events::PikaRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Pika, e.amount)
            }
            PikaPerpV3Events::VaultRewardDistributed(e) => {
                common::reward_distributed(batch, Reward::Vault, e.amount)
            }
            PikaPerpV3Events::OwnerUpdated(_) => Ok(Outcome::Ignored("owner update")),
        }
    }
}

impl PerpV3 {
    /// Trader statistics only count positions touched within `user_window`.
    pub fn new(user_window: TimeWindow) -> Self {
        Self { user_window }
    }

    fn threshold() -> I256 {
        num::small(LEGACY_LIQUIDATION_THRESHOLD)
    }

    fn new_position<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        e: &PikaPerpV3::NewPosition,
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

        let (mut position, single_amount, single_margin, fill_price) =
            match batch.load::<Position>(&fill.position_key()) {
                Some(position) => {
                    let added = fill.amount - position.amount;
                    let fill_price = if added.is_zero() {
                        fill.price
                    } else {
                        const WHAT: &str = "fill price";
                        num::div(
                            num::sub(
                                num::mul(fill.price, fill.amount, WHAT)?,
                                num::mul(position.price, position.amount, WHAT)?,
                                WHAT,
                            )?,
                            added,
                            WHAT,
                        )?
                    };
                    let single_margin = fill.margin - position.margin;
                    (position, added, single_margin, fill_price)
                }
                None => (fill.new_position(ctx), fill.amount, fill.margin, fill.price),
            };
        position.price = fill.price;
        fill.write_to(ctx, &mut position, Self::threshold())?;

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

        if self.user_window.contains(ctx.timestamp()) {
            let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
            user.volume += single_amount;
            user.fees += num::div(
                num::mul(single_amount, product.fee, "user fees")?,
                num::small(FEE_BASIS),
                "user fees",
            )?;
            batch.save(user);
        }

        batch.save(fill.transaction(ctx, vault.tx_count, single_amount, single_margin, fill_price));
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
        e: &PikaPerpV3::AddMargin,
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
            Self::threshold(),
        )?;
        position.updated_at_timestamp = ctx.timestamp();
        position.updated_at_block_number = ctx.block_number();

        vault.cumulative_margin += margin;
        let mut day = bucket::day_data(batch, ctx.timestamp());
        day.totals.cumulative_margin += margin;
        product.cumulative_margin += margin;

        batch.save(common::margin_activity(ctx, &position, ADDED_MARGIN, margin));
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
        e: &PikaPerpV3::ClosePosition,
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
        let pnl_is_negative = !fill.pnl.is_positive();
        let transaction = fill.transaction(ctx, vault.tx_count, &position);
        let trade = fill.trade(ctx, vault.trade_count, &position, pnl_is_negative)?;

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
        vault.cumulative_pnl += pnl;
        if pnl_is_negative || fill.was_liquidated {
            vault.balance += fill.pnl;
        } else {
            vault.balance -= fill.pnl;
        }

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

        if self.user_window.contains(ctx.timestamp()) {
            let mut user = common::trader(batch, &mut vault, &fill.owner, ctx.timestamp());
            user.volume += fill.amount;
            if !fill.was_liquidated {
                user.fees += fill.fee;
            }
            user.pnl += fill.pnl;
            batch.save(user);
        }

        fill.settle(batch, ctx, &mut vault, &mut product, position, Self::threshold())?;

        batch.save(transaction);
        batch.save(trade);
        batch.save(vault);
        batch.save(day);
        batch.save(product);
        Ok(Outcome::Applied)
    }
}
