use perp_indexer::{
    abi::perp_v3::PikaPerpV3::{self, PikaPerpV3Events},
    config::TimeWindow,
    entity::{Activity, Position, Trade, Transaction, TxAction, User, VAULT_ID, Vault},
    perp::PerpV3,
    reducer::Reducer,
    store::{MemoryStore, Store},
    testing::{ALICE, Feed, GENESIS_TIMESTAMP, e8, i, seed_market, u},
    types,
};
use tokio_test::assert_ok;

const PRODUCT: u64 = 1;

fn perp() -> PerpV3 {
    PerpV3::new(TimeWindow::new(GENESIS_TIMESTAMP, GENESIS_TIMESTAMP + 86_400))
}

fn open(margin: u64, price: u64) -> PikaPerpV3Events {
    PikaPerpV3Events::NewPosition(PikaPerpV3::NewPosition {
        positionId: u(1),
        user: ALICE,
        productId: u(PRODUCT),
        isLong: true,
        price: e8(price),
        oraclePrice: e8(price),
        margin: u(margin),
        leverage: e8(5),
        fee: u(3),
        fundingRate: i(-12),
    })
}

fn close(margin: u64, pnl: i64, liquidated: bool) -> PikaPerpV3Events {
    PikaPerpV3Events::ClosePosition(PikaPerpV3::ClosePosition {
        positionId: u(1),
        user: ALICE,
        productId: u(PRODUCT),
        price: e8(1900),
        entryPrice: e8(2000),
        margin: u(margin),
        leverage: e8(5),
        fee: u(3),
        pnl: i(pnl),
        fundingPayment: i(2),
        wasLiquidated: liquidated,
    })
}

fn setup() -> (MemoryStore, Feed) {
    let feed = Feed::genesis();
    let mut store = MemoryStore::new();
    seed_market(&mut store, feed.instant(), PRODUCT, 10, 0);
    (store, feed)
}

fn vault(store: &MemoryStore) -> Vault {
    store.load::<Vault>(VAULT_ID).unwrap()
}

#[test]
fn test_increase_backs_out_fill_price() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    // Reported price is the linear blend of 5000 @ 2000 and 5000 @ 3000.
    let ctx = feed.next(open(2000, 2500));
    assert_ok!(perp().apply(&mut store, &ctx));

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.price, i(2500_0000_0000));
    assert_eq!(position.amount, i(10_000));
    assert_eq!(position.funding, i(-12));

    let tx_id = Transaction::make_id(i(1), &ctx.tx_hash(), 2, TxAction::Open);
    let transaction = store.load::<Transaction>(&tx_id).unwrap();
    assert_eq!(transaction.price, i(3000_0000_0000));
    assert_eq!(transaction.single_amount, i(5000));
    assert_eq!(transaction.single_margin, i(1000));

    let vault = vault(&store);
    assert_eq!(vault.position_count, 2);
    assert_eq!(vault.cumulative_volume, i(10_000));
}

#[test]
fn test_zero_pnl_counts_as_negative() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    assert_ok!(perp().apply(&mut store, &feed.next(close(1000, 0, false))));

    let trade = store.load::<Trade>("1").unwrap();
    assert!(trade.pnl_is_negative);
    assert_eq!(trade.funding_payment, i(2));
    assert_eq!(vault(&store).balance, i(0));
}

#[test]
fn test_liquidated_profit_is_credited() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    let ctx = feed.advance(30).next(close(1000, 40, true));
    assert_ok!(perp().apply(&mut store, &ctx));

    assert_eq!(vault(&store).balance, i(40));
    let trade = store.load::<Trade>("1").unwrap();
    assert!(!trade.pnl_is_negative);
    assert_eq!(trade.trade_fee, i(3));

    let activities: Vec<&Activity> = store.all::<Activity>().collect();
    assert_eq!(activities.len(), 1);
    let activity = &activities[0];
    assert_eq!(activity.action, "Liquidated");
    assert_eq!(activity.kind, "market");
    assert_eq!(activity.size, i(5000));
    assert_eq!(activity.price, i(1900_0000_0000));
    assert_eq!(activity.timestamp, ctx.timestamp());

    let user = store.load::<User>(&types::account_id(&ALICE)).unwrap();
    // Open fee only, liquidations charge the trader nothing on close.
    assert_eq!(user.fees, i(5));
}

#[test]
fn test_profitable_close_debits_vault() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    assert_ok!(perp().apply(&mut store, &feed.next(close(1000, 40, false))));
    assert_eq!(vault(&store).balance, i(-40));
}

#[test]
fn test_users_outside_campaign_are_not_tracked() {
    let (mut store, mut feed) = setup();
    let perp = PerpV3::new(TimeWindow::new(0, GENESIS_TIMESTAMP));
    assert_ok!(perp.apply(&mut store, &feed.next(open(1000, 2000))));
    assert_ok!(perp.apply(&mut store, &feed.next(close(1000, 10, false))));

    assert!(store.load::<User>(&types::account_id(&ALICE)).is_none());
    let vault = vault(&store);
    assert_eq!(vault.user_count, 0);
    assert_eq!(vault.trade_count, 1);
    assert!(store.load::<Trade>("1").is_some());
}

#[test]
fn test_add_margin_records_activity() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    let event = PikaPerpV3Events::AddMargin(PikaPerpV3::AddMargin {
        positionId: u(1),
        user: ALICE,
        margin: u(1000),
        newMargin: u(2000),
        newLeverage: e8(2),
    });
    let ctx = feed.advance(12).next(event);
    assert_ok!(perp().apply(&mut store, &ctx));

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.margin, i(2000));
    // 2000 - 2000 * 0.8 / 2
    assert_eq!(position.liquidation_price, i(1200_0000_0000));
    assert_eq!(position.updated_at_block_number, 2);

    let id = Activity::make_id(&types::account_id(&ALICE), ctx.timestamp(), "Added margin", None);
    let activity = store.load::<Activity>(&id).unwrap();
    assert_eq!(activity.margin, i(1000));
    assert_eq!(activity.product_id, i(PRODUCT as i64));
}
