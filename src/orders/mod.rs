//! Order lifecycle reducers.
//!
//! Trigger orders live on the order book contract, market orders are queued
//! with the position manager. Both follow `open → executed` or
//! `open → cancelled`; a transition out of a terminal state is ignored and
//! leaves the [`OrderStat`] counters untouched.

mod book;
mod market;

use alloy::primitives::I256;

pub use book::TriggerOrders;
pub use market::MarketOrders;

use crate::{
    entity::{Activity, ORDER_STAT_ID, OrderCounter, OrderStat},
    store::{Batch, Store},
    types::{self, EventContext},
};

const ORDER_CANCELLED: &str = "Order cancelled";
const ORDER_EXECUTED: &str = "Order executed";

/// Ignore reason of a transition out of a terminal state.
const ALREADY_SETTLED: &str = "order already settled";

/// Ignore reason of an update of a settled order.
const NOT_OPEN: &str = "order is not open";

fn bump_stat<S: Store>(
    batch: &mut Batch<'_, S>,
    increment: OrderCounter,
    decrement: Option<OrderCounter>,
) {
    let mut stat = batch
        .load::<OrderStat>(ORDER_STAT_ID)
        .unwrap_or_else(OrderStat::new);
    stat.bump(increment, decrement);
    batch.save(stat);
}

/// Order terminal transition, as seen in the activity feed.
struct OrderActivity<'a> {
    account: &'a str,
    action: &'static str,
    kind: &'static str,
    product_id: I256,
    is_long: bool,
    margin: I256,
    size: I256,
    price: I256,
}

impl OrderActivity<'_> {
    fn into_activity<T>(self, ctx: &EventContext<T>) -> Activity {
        Activity {
            id: Activity::make_id(self.account, ctx.timestamp(), self.action, Some(self.kind)),
            account: self.account.to_string(),
            action: self.action.to_string(),
            kind: self.kind.to_string(),
            product_id: self.product_id,
            is_long: self.is_long,
            margin: self.margin,
            size: self.size,
            price: self.price,
            tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
            timestamp: ctx.timestamp(),
        }
    }
}
