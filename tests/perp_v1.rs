use alloy::primitives::U256;
use perp_indexer::{
    abi::perp_v1::PikaPerpV1::{self, PikaPerpV1Events},
    bucket,
    entity::{
        EntityKind, Liquidation, Position, Product, Trade, Transaction, TxAction, User, VAULT_ID,
        Vault, VaultDayData,
    },
    error::IndexerError,
    perp::PerpV1,
    reducer::Reducer,
    store::{MemoryStore, Store},
    testing::{ALICE, Feed, LIQUIDATOR, e8, i, seed_market, u},
    types::{self, Outcome},
};
use tokio_test::{assert_err, assert_ok};

const PRODUCT: u64 = 7;
const FEE_BPS: u64 = 10;

fn open(position_id: u64, margin: u64, price: u64) -> PikaPerpV1Events {
    PikaPerpV1Events::NewPosition(PikaPerpV1::NewPosition {
        positionId: u(position_id),
        user: ALICE,
        productId: u(PRODUCT),
        isLong: true,
        price: e8(price),
        margin: u(margin),
        leverage: e8(5),
        fee: u(3),
    })
}

fn close(position_id: u64, margin: u64, pnl: i64, liquidated: bool) -> PikaPerpV1Events {
    PikaPerpV1Events::ClosePosition(PikaPerpV1::ClosePosition {
        positionId: u(position_id),
        user: ALICE,
        productId: u(PRODUCT),
        price: e8(2010),
        entryPrice: e8(2000),
        margin: u(margin),
        leverage: e8(5),
        fee: u(3),
        pnl: i(pnl),
        wasLiquidated: liquidated,
    })
}

fn setup() -> (MemoryStore, Feed) {
    let feed = Feed::genesis();
    let mut store = MemoryStore::new();
    seed_market(&mut store, feed.instant(), PRODUCT, FEE_BPS, 0);
    (store, feed)
}

fn vault(store: &MemoryStore) -> Vault {
    store.load::<Vault>(VAULT_ID).unwrap()
}

fn product(store: &MemoryStore) -> Product {
    store.load::<Product>(&PRODUCT.to_string()).unwrap()
}

#[test]
fn test_open_then_full_close() {
    let (mut store, mut feed) = setup();

    let outcome = assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    assert_eq!(outcome, Outcome::Applied);

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.amount, i(5000));
    assert_eq!(position.margin, i(1000));
    assert_eq!(position.price, i(2000_0000_0000));
    assert_eq!(position.liquidation_price, i(1680_0000_0000));
    assert_eq!(position.owner, types::account_id(&ALICE));
    assert_eq!(product(&store).open_interest_long, i(5000));

    let close_ctx = feed.advance(60).next(close(1, 1000, 50, false));
    assert_ok!(PerpV1.apply(&mut store, &close_ctx));

    assert!(store.load::<Position>("1").is_none());
    let trade = store.load::<Trade>("1").unwrap();
    assert!(trade.is_full_close);
    assert!(!trade.pnl_is_negative);
    assert_eq!(trade.trade_fee, i(6));
    assert_eq!(trade.pnl, i(50));

    let tx_id = Transaction::make_id(i(1), &close_ctx.tx_hash(), 2, TxAction::Close);
    let transaction = store.load::<Transaction>(&tx_id).unwrap();
    assert!(!transaction.is_long);
    assert_eq!(transaction.trade_fee, i(3));

    let vault = vault(&store);
    assert_eq!(vault.position_count, 0);
    assert_eq!(vault.trade_count, 1);
    assert_eq!(vault.tx_count, 2);
    assert_eq!(vault.balance, i(-50));
    assert_eq!(vault.cumulative_pnl, i(50));
    assert_eq!(vault.user_count, 1);
    assert_eq!(product(&store).open_interest_long, i(0));

    let user = store.load::<User>(&types::account_id(&ALICE)).unwrap();
    assert_eq!(user.user_number, 1);
    assert_eq!(user.trade_count, 2);
    assert_eq!(user.volume, i(10_000));
    // 5000 * 10bps on open, the close fee itself on close.
    assert_eq!(user.fees, i(8));
    assert_eq!(user.pnl, i(50));
}

#[test]
fn test_losing_close_credits_vault() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 1000, -70, false))));

    let trade = store.load::<Trade>("1").unwrap();
    assert!(trade.pnl_is_negative);
    let vault = vault(&store);
    assert_eq!(vault.balance, i(70));
    assert_eq!(vault.cumulative_pnl, i(70));
}

#[test]
fn test_increase_blends_entry_price() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    let ctx = feed.next(open(1, 1500, 2100));
    assert_ok!(PerpV1.apply(&mut store, &ctx));

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.amount, i(7500));
    assert_eq!(position.price, i(203_333_333_333));
    assert_eq!(position.created_at_block_number, 1);

    let tx_id = Transaction::make_id(i(1), &ctx.tx_hash(), 2, TxAction::Open);
    let transaction = store.load::<Transaction>(&tx_id).unwrap();
    assert_eq!(transaction.single_amount, i(2500));
    assert_eq!(transaction.single_margin, i(500));
    assert_eq!(transaction.price, i(2100_0000_0000));
}

#[test]
fn test_partial_closes_then_full_close() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1500, 2000))));

    let opens: Vec<_> = store
        .all::<Transaction>()
        .map(|t| t.single_amount)
        .collect();
    assert_eq!(opens.into_iter().fold(i(0), |a, b| a + b), i(7500));

    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 500, 10, false))));
    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.margin, i(1000));
    assert_eq!(position.amount, i(5000));

    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 400, 10, false))));
    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.margin, i(600));
    assert_eq!(position.amount, i(3000));
    assert!(!store.load::<Trade>("2").unwrap().is_full_close);

    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 600, 10, false))));
    assert!(store.load::<Position>("1").is_none());
    assert!(store.load::<Trade>("3").unwrap().is_full_close);
}

#[test]
fn test_off_by_one_margin_is_partial_close() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 999, 0, false))));

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.margin, i(1));
    assert_eq!(position.amount, i(5));
    assert!(!store.load::<Trade>("1").unwrap().is_full_close);
    assert_eq!(vault(&store).position_count, 1);
}

#[test]
fn test_open_interest_and_position_count_floor_at_zero() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));

    let mut product = product(&store);
    product.open_interest_long = i(1000);
    product.position_count = 0;
    store.save(product);
    let mut vault = vault(&store);
    vault.position_count = 0;
    store.save(vault);

    assert_ok!(PerpV1.apply(&mut store, &feed.next(close(1, 1000, 0, false))));
    let product = self::product(&store);
    assert_eq!(product.open_interest_long, i(0));
    assert_eq!(product.position_count, 0);
    assert_eq!(self::vault(&store).position_count, 0);
}

#[test]
fn test_missing_product_skips_without_writes() {
    let (mut store, mut feed) = setup();
    let before = store.len();
    let event = PikaPerpV1Events::NewPosition(PikaPerpV1::NewPosition {
        positionId: u(1),
        user: ALICE,
        productId: u(99),
        isLong: false,
        price: e8(2000),
        margin: u(1000),
        leverage: e8(5),
        fee: u(3),
    });

    let outcome = assert_ok!(PerpV1.apply(&mut store, &feed.next(event)));
    assert!(matches!(outcome, Outcome::Skipped(ref m) if m.kind == EntityKind::Product && m.id == "99"));
    assert_eq!(store.len(), before);
    assert_eq!(vault(&store).tx_count, 0);
}

#[test]
fn test_zero_leverage_fails_without_writes() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    let before = vault(&store);

    let event = PikaPerpV1Events::AddMargin(PikaPerpV1::AddMargin {
        positionId: u(1),
        user: ALICE,
        margin: u(100),
        newMargin: u(1100),
        newLeverage: u(0),
    });
    assert!(PerpV1.apply(&mut store, &feed.next(event)).is_err());
    assert_eq!(vault(&store), before);
    assert_eq!(store.load::<Position>("1").unwrap().margin, i(1000));
}

#[test]
fn test_oversized_position_overflows_without_writes() {
    let (mut store, mut feed) = setup();
    let event = PikaPerpV1Events::NewPosition(PikaPerpV1::NewPosition {
        positionId: u(1),
        user: ALICE,
        productId: u(PRODUCT),
        isLong: true,
        price: e8(2000),
        margin: U256::from(1) << 200,
        leverage: U256::from(1) << 60,
        fee: u(3),
    });
    let before = vault(&store);

    let err = assert_err!(PerpV1.apply(&mut store, &feed.next(event)));
    assert!(matches!(err, IndexerError::Overflow("notional size")));
    assert_eq!(vault(&store), before);
    assert_eq!(product(&store).open_interest_long, i(0));
    assert_eq!(store.count(EntityKind::Position), 0);
}

#[test]
fn test_add_margin_updates_liquidation_price() {
    let (mut store, mut feed) = setup();
    assert_ok!(PerpV1.apply(&mut store, &feed.next(open(1, 1000, 2000))));
    let event = PikaPerpV1Events::AddMargin(PikaPerpV1::AddMargin {
        positionId: u(1),
        user: ALICE,
        margin: u(250),
        newMargin: u(1250),
        newLeverage: e8(4),
    });
    assert_ok!(PerpV1.apply(&mut store, &feed.next(event)));

    let position = store.load::<Position>("1").unwrap();
    assert_eq!(position.margin, i(1250));
    assert_eq!(position.liquidation_price, i(1600_0000_0000));
    assert_eq!(vault(&store).cumulative_margin, i(1250));
    assert_eq!(store.count(EntityKind::Activity), 0);
}

#[test]
fn test_liquidation_payout() {
    let (mut store, mut feed) = setup();
    let event = PikaPerpV1Events::PositionLiquidated(PikaPerpV1::PositionLiquidated {
        positionId: u(1),
        liquidator: LIQUIDATOR,
        liquidatorReward: u(30),
        remainingReward: u(70),
    });
    assert_ok!(PerpV1.apply(&mut store, &feed.next(event)));

    let liquidation = store.load::<Liquidation>("0").unwrap();
    assert_eq!(liquidation.liquidator, types::account_id(&LIQUIDATOR));
    assert_eq!(vault(&store).liquidation_count, 1);

    let day = store
        .load::<VaultDayData>(&bucket::day_id(feed.timestamp()).to_string())
        .unwrap();
    assert_eq!(day.totals.liquidator_reward, i(30));
    assert_eq!(day.totals.remaining_reward, i(70));
}

#[test]
fn test_product_added_is_idempotent() {
    let mut feed = Feed::genesis();
    let mut store = MemoryStore::new();
    let added = |fee| {
        PikaPerpV1Events::ProductAdded(PikaPerpV1::ProductAdded {
            productId: u(3),
            product: PikaPerpV1::Product {
                productToken: ALICE,
                maxLeverage: e8(50),
                fee,
                isActive: false,
                openInterestLong: 0,
                openInterestShort: 0,
                minPriceChange: 1,
                weight: 100,
                reserve: 0,
            },
        })
    };

    assert_ok!(PerpV1.apply(&mut store, &feed.next(added(10))));
    let outcome = assert_ok!(PerpV1.apply(&mut store, &feed.next(added(20))));
    assert!(matches!(outcome, Outcome::Ignored(_)));

    let product = store.load::<Product>("3").unwrap();
    assert_eq!(product.fee, i(10));
    assert!(product.is_active);
}

#[test]
fn test_owner_update_is_ignored() {
    let (mut store, mut feed) = setup();
    let before = vault(&store);
    let event = PikaPerpV1Events::OwnerUpdated(PikaPerpV1::OwnerUpdated { newOwner: ALICE });
    let outcome = assert_ok!(PerpV1.apply(&mut store, &feed.next(event)));
    assert!(matches!(outcome, Outcome::Ignored(_)));
    assert_eq!(vault(&store), before);
}
