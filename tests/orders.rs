use perp_indexer::{
    abi::{
        order_book::OrderBook::{self, OrderBookEvents},
        position_manager::PositionManager::{self, PositionManagerEvents},
    },
    entity::{
        Activity, EntityKind, MarketOrder, ORDER_STAT_ID, Order, OrderCounter, OrderKind,
        OrderStat, OrderStatus, order_id,
    },
    orders::{MarketOrders, TriggerOrders},
    reducer::Reducer,
    store::{MemoryStore, Store},
    testing::{ALICE, Feed, e8, i, u},
    types::{self, Outcome},
};
use tokio_test::assert_ok;

fn create_open(index: u64, is_long: bool, above: bool) -> OrderBookEvents {
    OrderBookEvents::CreateOpenOrder(OrderBook::CreateOpenOrder {
        account: ALICE,
        orderIndex: u(index),
        productId: u(1),
        margin: u(1000),
        leverage: e8(3),
        tradeFee: u(2),
        isLong: is_long,
        triggerPrice: e8(1800),
        triggerAboveThreshold: above,
        executionFee: u(1),
    })
}

fn create_close(index: u64, is_long: bool, above: bool) -> OrderBookEvents {
    OrderBookEvents::CreateCloseOrder(OrderBook::CreateCloseOrder {
        account: ALICE,
        orderIndex: u(index),
        productId: u(1),
        size: u(1500),
        isLong: is_long,
        triggerPrice: e8(2200),
        triggerAboveThreshold: above,
        executionFee: u(1),
    })
}

fn cancel_open(index: u64) -> OrderBookEvents {
    OrderBookEvents::CancelOpenOrder(OrderBook::CancelOpenOrder {
        account: ALICE,
        orderIndex: u(index),
    })
}

fn execute_open(index: u64, price: u64) -> OrderBookEvents {
    OrderBookEvents::ExecuteOpenOrder(OrderBook::ExecuteOpenOrder {
        account: ALICE,
        orderIndex: u(index),
        executionPrice: e8(price),
    })
}

fn account() -> String {
    types::account_id(&ALICE)
}

fn order(store: &MemoryStore, is_open: bool, index: i64) -> Order {
    store
        .load::<Order>(&order_id(&account(), is_open, i(index)))
        .unwrap()
}

fn stat(store: &MemoryStore) -> OrderStat {
    store.load::<OrderStat>(ORDER_STAT_ID).unwrap()
}

#[test]
fn test_trigger_orders_are_classified_on_creation() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    let events = [
        create_open(1, true, false),
        create_open(2, false, false),
        create_close(1, true, true),
        create_close(2, false, true),
    ];
    for event in events {
        assert_ok!(TriggerOrders.apply(&mut store, &feed.next(event)));
    }

    assert_eq!(order(&store, true, 1).kind, OrderKind::Limit);
    assert_eq!(order(&store, true, 2).kind, OrderKind::StopMarket);
    assert_eq!(order(&store, false, 1).kind, OrderKind::Limit);
    assert_eq!(order(&store, false, 2).kind, OrderKind::StopMarket);

    let open = order(&store, true, 1);
    assert_eq!(open.status, OrderStatus::Open);
    assert_eq!(open.size, i(3000));
    assert_eq!(open.created_timestamp, feed.timestamp());
    let close = order(&store, false, 2);
    assert_eq!(close.size, i(1500));
    assert!(!close.is_open);

    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateOpenTrigger), 2);
    assert_eq!(stat.get(OrderCounter::CreateCloseTrigger), 2);
}

#[test]
fn test_execute_records_price_and_activity() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(create_open(1, true, false))));
    let ctx = feed.advance(120).next(execute_open(1, 1795));
    assert_ok!(TriggerOrders.apply(&mut store, &ctx));

    let order = order(&store, true, 1);
    assert_eq!(order.status, OrderStatus::Executed);
    assert_eq!(order.execution_price, i(1795_0000_0000));
    assert_eq!(order.executed_timestamp, ctx.timestamp());

    let id = Activity::make_id(&account(), ctx.timestamp(), "Order executed", Some("limit"));
    let activity = store.load::<Activity>(&id).unwrap();
    assert_eq!(activity.kind, "limit");
    assert_eq!(activity.price, i(1795_0000_0000));
    assert_eq!(activity.size, i(3000));

    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateOpenTrigger), 0);
    assert_eq!(stat.get(OrderCounter::ExecutedOpenTrigger), 1);
}

#[test]
fn test_first_terminal_transition_wins() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(create_open(1, true, false))));
    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(create_open(2, true, false))));

    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(execute_open(1, 1795))));
    let outcome = assert_ok!(TriggerOrders.apply(&mut store, &feed.next(cancel_open(1))));
    assert!(matches!(outcome, Outcome::Ignored(_)));
    assert_eq!(order(&store, true, 1).status, OrderStatus::Executed);

    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(cancel_open(2))));
    let outcome = assert_ok!(TriggerOrders.apply(&mut store, &feed.next(execute_open(2, 1700))));
    assert!(matches!(outcome, Outcome::Ignored(_)));
    let cancelled = order(&store, true, 2);
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.execution_price, i(0));

    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateOpenTrigger), 0);
    assert_eq!(stat.get(OrderCounter::ExecutedOpenTrigger), 1);
    assert_eq!(stat.get(OrderCounter::CancelledOpenTrigger), 1);
    assert_eq!(store.count(EntityKind::Activity), 2);
}

#[test]
fn test_update_of_settled_order_is_ignored() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(create_open(1, true, false))));

    let order_timestamp = feed.timestamp() + 30;
    let update = |margin| {
        OrderBookEvents::UpdateOpenOrder(OrderBook::UpdateOpenOrder {
            account: ALICE,
            orderIndex: u(1),
            margin: u(margin),
            leverage: e8(2),
            triggerPrice: e8(1750),
            triggerAboveThreshold: false,
            orderTimestamp: u(order_timestamp),
        })
    };

    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(update(2000))));
    let updated = order(&store, true, 1);
    assert_eq!(updated.size, i(4000));
    assert_eq!(updated.trigger_price, i(1750_0000_0000));
    assert_eq!(updated.updated_timestamp, order_timestamp);

    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(cancel_open(1))));
    let outcome = assert_ok!(TriggerOrders.apply(&mut store, &feed.next(update(500))));
    assert!(matches!(outcome, Outcome::Ignored(_)));
    assert_eq!(order(&store, true, 1).margin, i(2000));
}

#[test]
fn test_close_order_cancel_uses_close_counters() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(TriggerOrders.apply(&mut store, &feed.next(create_close(4, false, false))));
    let cancel = OrderBookEvents::CancelCloseOrder(OrderBook::CancelCloseOrder {
        account: ALICE,
        orderIndex: u(4),
    });
    let ctx = feed.next(cancel);
    assert_ok!(TriggerOrders.apply(&mut store, &ctx));

    assert_eq!(order(&store, false, 4).status, OrderStatus::Cancelled);
    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateCloseTrigger), 0);
    assert_eq!(stat.get(OrderCounter::CancelledCloseTrigger), 1);
    assert_eq!(stat.get(OrderCounter::CancelledOpenTrigger), 0);

    let id = Activity::make_id(&account(), ctx.timestamp(), "Order cancelled", Some("limit"));
    assert_eq!(store.load::<Activity>(&id).unwrap().price, i(2200_0000_0000));
}

#[test]
fn test_unknown_order_is_skipped() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    let outcome = assert_ok!(TriggerOrders.apply(&mut store, &feed.next(cancel_open(9))));
    assert!(matches!(outcome, Outcome::Skipped(ref m) if m.kind == EntityKind::Order));
    assert!(store.is_empty());
}

fn market_open(index: u64) -> PositionManagerEvents {
    PositionManagerEvents::CreateOpenPosition(PositionManager::CreateOpenPosition {
        account: ALICE,
        index: u(index),
        productId: u(1),
        margin: u(1000),
        leverage: e8(4),
        tradeFee: u(2),
        isLong: true,
        acceptablePrice: e8(2010),
        executionFee: u(1),
        blockNumber: u(100),
        blockTime: u(1_690_000_000),
    })
}

fn market_close(index: u64) -> PositionManagerEvents {
    PositionManagerEvents::CreateClosePosition(PositionManager::CreateClosePosition {
        account: ALICE,
        index: u(index),
        productId: u(1),
        margin: u(500),
        isLong: true,
        acceptablePrice: e8(1990),
        executionFee: u(1),
        blockNumber: u(110),
        blockTime: u(1_690_000_100),
    })
}

fn market_order(store: &MemoryStore, is_open: bool, index: i64) -> MarketOrder {
    store
        .load::<MarketOrder>(&order_id(&account(), is_open, i(index)))
        .unwrap()
}

#[test]
fn test_market_close_takes_open_leverage() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(MarketOrders.apply(&mut store, &feed.next(market_open(3))));
    assert_ok!(MarketOrders.apply(&mut store, &feed.next(market_close(3))));

    let open = market_order(&store, true, 3);
    assert_eq!(open.size, i(4000));
    assert_eq!(open.created_block_number, i(100));
    assert_eq!(open.created_timestamp, i(1_690_000_000));

    let close = market_order(&store, false, 3);
    assert_eq!(close.leverage, i(4_0000_0000));
    assert_eq!(close.size, i(2000));
    assert_eq!(close.status, OrderStatus::Open);

    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateOpenMarket), 1);
    assert_eq!(stat.get(OrderCounter::CreateCloseMarket), 1);
}

#[test]
fn test_market_close_without_open_is_skipped() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    let outcome = assert_ok!(MarketOrders.apply(&mut store, &feed.next(market_close(3))));
    assert!(matches!(outcome, Outcome::Skipped(ref m) if m.kind == EntityKind::MarketOrder));
    assert!(store.is_empty());
}

#[test]
fn test_market_execute_and_cancel() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    assert_ok!(MarketOrders.apply(&mut store, &feed.next(market_open(1))));
    assert_ok!(MarketOrders.apply(&mut store, &feed.next(market_close(1))));

    let execute = PositionManagerEvents::ExecuteOpenPosition(PositionManager::ExecuteOpenPosition {
        account: ALICE,
        index: u(1),
        blockGap: u(2),
        timeGap: u(5),
    });
    let ctx = feed.advance(5).next(execute);
    assert_ok!(MarketOrders.apply(&mut store, &ctx));

    let cancel = PositionManagerEvents::CancelClosePosition(PositionManager::CancelClosePosition {
        account: ALICE,
        index: u(1),
        blockGap: u(30),
        timeGap: u(180),
    });
    assert_ok!(MarketOrders.apply(&mut store, &feed.next(cancel)));

    let open = market_order(&store, true, 1);
    assert_eq!(open.status, OrderStatus::Executed);
    assert_eq!(open.executed_block_gap, i(2));
    assert_eq!(open.executed_time_gap, i(5));
    let close = market_order(&store, false, 1);
    assert_eq!(close.status, OrderStatus::Cancelled);
    assert_eq!(close.cancelled_block_gap, i(30));
    assert_eq!(close.cancelled_time_gap, i(180));

    let id = Activity::make_id(&account(), ctx.timestamp(), "Order executed", Some("market"));
    let activity = store.load::<Activity>(&id).unwrap();
    assert_eq!(activity.price, i(2010_0000_0000));
    assert_eq!(activity.margin, i(1000));

    let stat = stat(&store);
    assert_eq!(stat.get(OrderCounter::CreateOpenMarket), 0);
    assert_eq!(stat.get(OrderCounter::CreateCloseMarket), 0);
    assert_eq!(stat.get(OrderCounter::ExecutedOpenMarket), 1);
    assert_eq!(stat.get(OrderCounter::CancelledCloseMarket), 1);

    let again = PositionManagerEvents::CancelOpenPosition(PositionManager::CancelOpenPosition {
        account: ALICE,
        index: u(1),
        blockGap: u(1),
        timeGap: u(1),
    });
    let outcome = assert_ok!(MarketOrders.apply(&mut store, &feed.next(again)));
    assert!(matches!(outcome, Outcome::Ignored(_)));
    assert_eq!(market_order(&store, true, 1).status, OrderStatus::Executed);
}
