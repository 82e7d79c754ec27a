use alloy::primitives::{Address, U256};

use super::{ALREADY_SETTLED, NOT_OPEN, ORDER_CANCELLED, ORDER_EXECUTED, OrderActivity, bump_stat};
use crate::{
    abi::order_book::OrderBook::OrderBookEvents,
    entity::{Order, OrderCounter, OrderKind, OrderStatus, order_id},
    error::IndexerError,
    num,
    perp::UNIT,
    reducer::{Reducer, require},
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Reducer of the trigger order book.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriggerOrders;

/// Terminal transition of a trigger order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settle {
    Cancel,
    Execute { price: U256 },
}

impl Reducer for TriggerOrders {
    type Event = OrderBookEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        match event.event() {
            OrderBookEvents::CreateOpenOrder(e) => {
                let margin = num::int(e.margin)?;
                let leverage = num::int(e.leverage)?;
                let mut order = new_order(event, &e.account, true, e.orderIndex, e.isLong)?;
                order.kind = OrderKind::classify(true, e.isLong, e.triggerAboveThreshold);
                order.product_id = num::int(e.productId)?;
                order.margin = margin;
                order.leverage = leverage;
                order.size = num::notional(margin, leverage, UNIT)?;
                order.trade_fee = num::int(e.tradeFee)?;
                order.trigger_price = num::int(e.triggerPrice)?;
                order.trigger_above_threshold = e.triggerAboveThreshold;
                order.execution_fee = num::int(e.executionFee)?;
                batch.save(order);
                bump_stat(batch, OrderCounter::CreateOpenTrigger, None);
                Ok(Outcome::Applied)
            }
            OrderBookEvents::CreateCloseOrder(e) => {
                let mut order = new_order(event, &e.account, false, e.orderIndex, e.isLong)?;
                order.kind = OrderKind::classify(false, e.isLong, e.triggerAboveThreshold);
                order.product_id = num::int(e.productId)?;
                order.size = num::int(e.size)?;
                order.trigger_price = num::int(e.triggerPrice)?;
                order.trigger_above_threshold = e.triggerAboveThreshold;
                order.execution_fee = num::int(e.executionFee)?;
                batch.save(order);
                bump_stat(batch, OrderCounter::CreateCloseTrigger, None);
                Ok(Outcome::Applied)
            }
            OrderBookEvents::UpdateOpenOrder(e) => {
                let key = order_id(&types::account_id(&e.account), true, num::int(e.orderIndex)?);
                let mut order = require!(batch, Order, key);
                if order.status != OrderStatus::Open {
                    return Ok(Outcome::Ignored(NOT_OPEN));
                }
                order.margin = num::int(e.margin)?;
                order.leverage = num::int(e.leverage)?;
                order.size = num::notional(order.margin, order.leverage, UNIT)?;
                order.trigger_price = num::int(e.triggerPrice)?;
                order.trigger_above_threshold = e.triggerAboveThreshold;
                order.updated_timestamp = e.orderTimestamp.saturating_to();
                batch.save(order);
                Ok(Outcome::Applied)
            }
            OrderBookEvents::UpdateCloseOrder(e) => {
                let key = order_id(&types::account_id(&e.account), false, num::int(e.orderIndex)?);
                let mut order = require!(batch, Order, key);
                if order.status != OrderStatus::Open {
                    return Ok(Outcome::Ignored(NOT_OPEN));
                }
                order.size = num::int(e.size)?;
                order.trigger_price = num::int(e.triggerPrice)?;
                order.trigger_above_threshold = e.triggerAboveThreshold;
                order.updated_timestamp = e.orderTimestamp.saturating_to();
                batch.save(order);
                Ok(Outcome::Applied)
            }
            OrderBookEvents::CancelOpenOrder(e) => {
                settle(batch, event, &e.account, true, e.orderIndex, Settle::Cancel)
            }
            OrderBookEvents::CancelCloseOrder(e) => {
                settle(batch, event, &e.account, false, e.orderIndex, Settle::Cancel)
            }
            OrderBookEvents::ExecuteOpenOrder(e) => settle(
                batch,
                event,
                &e.account,
                true,
                e.orderIndex,
                Settle::Execute {
                    price: e.executionPrice,
                },
            ),
            OrderBookEvents::ExecuteCloseOrder(e) => settle(
                batch,
                event,
                &e.account,
                false,
                e.orderIndex,
                Settle::Execute {
                    price: e.executionPrice,
                },
            ),
        }
    }
}

fn new_order<T>(
    ctx: &EventContext<T>,
    account: &Address,
    is_open: bool,
    index: U256,
    is_long: bool,
) -> Result<Order, IndexerError> {
    let account = types::account_id(account);
    let index = num::int(index)?;
    Ok(Order {
        id: order_id(&account, is_open, index),
        account,
        index,
        is_open,
        is_long,
        status: OrderStatus::Open,
        created_timestamp: ctx.timestamp(),
        updated_timestamp: ctx.timestamp(),
        ..Default::default()
    })
}

fn settle<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    account: &Address,
    is_open: bool,
    index: U256,
    transition: Settle,
) -> Result<Outcome, IndexerError> {
    let account = types::account_id(account);
    let mut order = require!(batch, Order, order_id(&account, is_open, num::int(index)?));
    if order.status.is_terminal() {
        return Ok(Outcome::Ignored(ALREADY_SETTLED));
    }

    let created = if is_open {
        OrderCounter::CreateOpenTrigger
    } else {
        OrderCounter::CreateCloseTrigger
    };
    let (counter, action, price) = match (transition, is_open) {
        (Settle::Cancel, true) => (
            OrderCounter::CancelledOpenTrigger,
            ORDER_CANCELLED,
            order.trigger_price,
        ),
        (Settle::Cancel, false) => (
            OrderCounter::CancelledCloseTrigger,
            ORDER_CANCELLED,
            order.trigger_price,
        ),
        (Settle::Execute { price }, true) => (
            OrderCounter::ExecutedOpenTrigger,
            ORDER_EXECUTED,
            num::int(price)?,
        ),
        (Settle::Execute { price }, false) => (
            OrderCounter::ExecutedCloseTrigger,
            ORDER_EXECUTED,
            num::int(price)?,
        ),
    };
    match transition {
        Settle::Cancel => {
            order.status = OrderStatus::Cancelled;
            order.cancelled_timestamp = ctx.timestamp();
        }
        Settle::Execute { .. } => {
            order.status = OrderStatus::Executed;
            order.executed_timestamp = ctx.timestamp();
            order.execution_price = price;
        }
    }

    batch.save(
        OrderActivity {
            account: &account,
            action,
            kind: order.kind.as_str(),
            product_id: order.product_id,
            is_long: order.is_long,
            margin: order.margin,
            size: order.size,
            price,
        }
        .into_activity(ctx),
    );
    batch.save(order);
    bump_stat(batch, counter, Some(created));
    Ok(Outcome::Applied)
}
