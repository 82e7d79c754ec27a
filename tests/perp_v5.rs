use perp_indexer::{
    abi::perp_v5::PikaPerpV5::{self, PikaPerpV5Events},
    bucket,
    entity::{Activity, EntityKind, Position, Transaction, TxAction, VAULT_ID, Vault, VaultDayData},
    perp::PerpV5,
    reducer::Reducer,
    store::{MemoryStore, Store},
    testing::{ALICE, Feed, GENESIS_TIMESTAMP, e8, i, seed_market, u},
    types::{self, Outcome},
};
use tokio_test::assert_ok;

const PRODUCT: u64 = 5;

fn perp() -> PerpV5 {
    PerpV5::new(GENESIS_TIMESTAMP)
}

fn open(margin: u64, price: u64) -> PikaPerpV5Events {
    PikaPerpV5Events::NewPosition(PikaPerpV5::NewPosition {
        positionId: u(9),
        user: ALICE,
        productId: u(PRODUCT),
        isLong: false,
        price: e8(price),
        oraclePrice: e8(price),
        margin: u(margin),
        leverage: e8(5),
        fee: u(3),
        fundingRate: i(7),
    })
}

fn remove_margin(margin: u64, new_margin: u64, new_leverage: u64) -> PikaPerpV5Events {
    PikaPerpV5Events::RemoveMargin(PikaPerpV5::RemoveMargin {
        positionId: u(9),
        user: ALICE,
        margin: u(margin),
        newMargin: u(new_margin),
        newLeverage: e8(new_leverage),
    })
}

fn setup() -> (MemoryStore, Feed) {
    let feed = Feed::genesis();
    let mut store = MemoryStore::new();
    seed_market(&mut store, feed.instant(), PRODUCT, 10, 9000);
    (store, feed)
}

#[test]
fn test_increase_backs_out_harmonic_fill_price() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    // Reported price is the harmonic blend of 5000 @ 2000 and 5000 @ 3000.
    let ctx = feed.next(open(2000, 2400));
    assert_ok!(perp().apply(&mut store, &ctx));

    let position = store.load::<Position>("9").unwrap();
    assert_eq!(position.price, i(2400_0000_0000));
    assert_eq!(position.amount, i(10_000));
    // Short: 2400 + 2400 * 0.9 / 5
    assert_eq!(position.liquidation_price, i(2832_0000_0000));

    let tx_id = Transaction::make_id(i(9), &ctx.tx_hash(), 2, TxAction::Open);
    let transaction = store.load::<Transaction>(&tx_id).unwrap();
    assert_eq!(transaction.price, i(3000_0000_0000));
    assert_eq!(transaction.single_amount, i(5000));

    let vault = store.load::<Vault>(VAULT_ID).unwrap();
    assert_eq!(vault.position_count, 1);
    assert_eq!(vault.cumulative_margin, i(2000));
}

#[test]
fn test_same_size_reopen_keeps_event_price() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    let ctx = feed.next(open(1000, 2100));
    assert_ok!(perp().apply(&mut store, &ctx));

    let tx_id = Transaction::make_id(i(9), &ctx.tx_hash(), 2, TxAction::Open);
    let transaction = store.load::<Transaction>(&tx_id).unwrap();
    assert_eq!(transaction.single_amount, i(0));
    assert_eq!(transaction.price, i(2100_0000_0000));
}

#[test]
fn test_remove_margin_leaves_totals_untouched() {
    let (mut store, mut feed) = setup();
    assert_ok!(perp().apply(&mut store, &feed.next(open(1000, 2000))));
    let vault_before = store.load::<Vault>(VAULT_ID).unwrap();
    let day_id = bucket::day_id(feed.timestamp()).to_string();
    let day_before = store.load::<VaultDayData>(&day_id).unwrap();

    let ctx = feed.advance(60).next(remove_margin(200, 800, 10));
    let outcome = assert_ok!(perp().apply(&mut store, &ctx));
    assert_eq!(outcome, Outcome::Applied);

    let position = store.load::<Position>("9").unwrap();
    assert_eq!(position.margin, i(800));
    assert_eq!(position.leverage, i(10_0000_0000));
    // 2000 + 2000 * 0.9 / 10
    assert_eq!(position.liquidation_price, i(2180_0000_0000));
    assert_eq!(position.updated_at_timestamp, ctx.timestamp());

    assert_eq!(store.load::<Vault>(VAULT_ID).unwrap(), vault_before);
    assert_eq!(store.load::<VaultDayData>(&day_id).unwrap(), day_before);

    let id = Activity::make_id(&types::account_id(&ALICE), ctx.timestamp(), "Removed margin", None);
    let activity = store.load::<Activity>(&id).unwrap();
    assert_eq!(activity.margin, i(200));
    assert_eq!(activity.product_id, i(PRODUCT as i64));
}

#[test]
fn test_remove_margin_of_unknown_position_is_skipped() {
    let (mut store, mut feed) = setup();
    let outcome = assert_ok!(perp().apply(&mut store, &feed.next(remove_margin(200, 800, 10))));
    assert!(matches!(outcome, Outcome::Skipped(ref m) if m.kind == EntityKind::Position));
    assert_eq!(store.count(EntityKind::Activity), 0);
}
