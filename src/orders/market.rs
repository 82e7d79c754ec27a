use alloy::primitives::{Address, U256};

use super::{ALREADY_SETTLED, ORDER_CANCELLED, ORDER_EXECUTED, OrderActivity, bump_stat};
use crate::{
    abi::position_manager::PositionManager::PositionManagerEvents,
    entity::{MarketOrder, OrderCounter, OrderStatus, order_id},
    error::IndexerError,
    num,
    perp::UNIT,
    reducer::{Reducer, require},
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Activity kind of market order transitions.
const MARKET: &str = "market";

/// Reducer of market order requests queued with the position manager.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarketOrders;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settle {
    Cancel,
    Execute,
}

impl Reducer for MarketOrders {
    type Event = PositionManagerEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            PositionManagerEvents::CreateOpenPosition(e) => {
                let account = types::account_id(&e.account);
                let index = num::int(e.index)?;
                let margin = num::int(e.margin)?;
                let leverage = num::int(e.leverage)?;
                batch.save(MarketOrder {
                    id: order_id(&account, true, index),
                    account,
                    index,
                    is_open: true,
                    product_id: num::int(e.productId)?,
                    status: OrderStatus::Open,
                    is_long: e.isLong,
                    margin,
                    leverage,
                    size: num::notional(margin, leverage, UNIT)?,
                    trade_fee: num::int(e.tradeFee)?,
                    acceptable_price: num::int(e.acceptablePrice)?,
                    execution_fee: num::int(e.executionFee)?,
                    created_block_number: num::int(e.blockNumber)?,
                    created_timestamp: num::int(e.blockTime)?,
                    ..Default::default()
                });
                bump_stat(batch, OrderCounter::CreateOpenMarket, None);
                Ok(Outcome::Applied)
            }
            PositionManagerEvents::CreateClosePosition(e) => {
                let account = types::account_id(&e.account);
                let index = num::int(e.index)?;
                // Close requests carry no leverage, it is taken from the
                // open request sharing their index.
                let open = require!(batch, MarketOrder, order_id(&account, true, index));
                let margin = num::int(e.margin)?;
                batch.save(MarketOrder {
                    id: order_id(&account, false, index),
                    account,
                    index,
                    is_open: false,
                    product_id: num::int(e.productId)?,
                    status: OrderStatus::Open,
                    is_long: e.isLong,
                    margin,
                    leverage: open.leverage,
                    size: num::notional(margin, open.leverage, UNIT)?,
                    acceptable_price: num::int(e.acceptablePrice)?,
                    execution_fee: num::int(e.executionFee)?,
                    created_block_number: num::int(e.blockNumber)?,
                    created_timestamp: num::int(e.blockTime)?,
                    ..Default::default()
                });
                bump_stat(batch, OrderCounter::CreateCloseMarket, None);
                Ok(Outcome::Applied)
            }
            PositionManagerEvents::CancelOpenPosition(e) => settle(
                batch,
                event,
                (&e.account, true, e.index),
                Settle::Cancel,
                e.blockGap,
                e.timeGap,
            ),
            PositionManagerEvents::CancelClosePosition(e) => settle(
                batch,
                event,
                (&e.account, false, e.index),
                Settle::Cancel,
                e.blockGap,
                e.timeGap,
            ),
            PositionManagerEvents::ExecuteOpenPosition(e) => settle(
                batch,
                event,
                (&e.account, true, e.index),
                Settle::Execute,
                e.blockGap,
                e.timeGap,
            ),
            PositionManagerEvents::ExecuteClosePosition(e) => settle(
                batch,
                event,
                (&e.account, false, e.index),
                Settle::Execute,
                e.blockGap,
                e.timeGap,
            ),
        }
    }
}

fn settle<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    (account, is_open, index): (&Address, bool, U256),
    transition: Settle,
    block_gap: U256,
    time_gap: U256,
) -> Result<Outcome, IndexerError> {
    let account = types::account_id(account);
    let mut order = require!(batch, MarketOrder, order_id(&account, is_open, num::int(index)?));
    if order.status.is_terminal() {
        return Ok(Outcome::Ignored(ALREADY_SETTLED));
    }

    let block_gap = num::int(block_gap)?;
    let time_gap = num::int(time_gap)?;
    let (counter, action) = match transition {
        Settle::Cancel => {
            order.status = OrderStatus::Cancelled;
            order.cancelled_block_gap = block_gap;
            order.cancelled_time_gap = time_gap;
            let counter = if is_open {
                OrderCounter::CancelledOpenMarket
            } else {
                OrderCounter::CancelledCloseMarket
            };
            (counter, ORDER_CANCELLED)
        }
        Settle::Execute => {
            order.status = OrderStatus::Executed;
            order.executed_block_gap = block_gap;
            order.executed_time_gap = time_gap;
            let counter = if is_open {
                OrderCounter::ExecutedOpenMarket
            } else {
                OrderCounter::ExecutedCloseMarket
            };
            (counter, ORDER_EXECUTED)
        }
    };
    let created = if is_open {
        OrderCounter::CreateOpenMarket
    } else {
        OrderCounter::CreateCloseMarket
    };

    batch.save(
        OrderActivity {
            account: &account,
            action,
            kind: MARKET,
            product_id: order.product_id,
            is_long: order.is_long,
            margin: order.margin,
            size: order.size,
            price: order.acceptable_price,
        }
        .into_activity(ctx),
    );
    batch.save(order);
    bump_stat(batch, counter, Some(created));
    Ok(Outcome::Applied)
}
