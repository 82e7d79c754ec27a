use alloy::primitives::{Address, I256, U256};

use crate::{
    bucket::{self, THIRTY_DAYS},
    entity::{
        Activity, Liquidation, Position, Product, Stake, Trade, Transaction, TxAction, User,
        VAULT_ID, Vault,
    },
    error::IndexerError,
    num,
    reducer::require,
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Product configuration as carried by the admin events.
#[derive(Clone, Debug)]
pub(crate) struct ProductParams {
    pub product_token: Address,
    pub max_leverage: U256,
    pub fee: u16,
    pub is_active: bool,
    pub min_price_change: u32,
    pub weight: u32,
    pub reserve: u64,
    pub liquidation_threshold: Option<u16>,
}

impl ProductParams {
    fn write_to(&self, product: &mut Product) -> Result<(), IndexerError> {
        product.product_token = self.product_token;
        product.max_leverage = num::int(self.max_leverage)?;
        product.fee = num::small(self.fee.into());
        product.min_price_change = num::small(self.min_price_change.into());
        product.weight = num::small(self.weight.into());
        product.reserve = num::small(self.reserve);
        if let Some(threshold) = self.liquidation_threshold {
            product.liquidation_threshold = num::small(threshold.into());
        }
        Ok(())
    }
}

/// Creates the product unless it already exists. New products start active.
pub(crate) fn product_added<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    product_id: U256,
    params: ProductParams,
) -> Result<Outcome, IndexerError> {
    let id = product_id.to_string();
    if batch.exists::<Product>(&id) {
        return Ok(Outcome::Ignored("product already exists"));
    }
    let mut product = Product::new(id, ctx.instant());
    params.write_to(&mut product)?;
    batch.save(product);
    Ok(Outcome::Applied)
}

pub(crate) fn product_updated<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    product_id: U256,
    params: ProductParams,
) -> Result<Outcome, IndexerError> {
    let mut product = require!(batch, Product, product_id.to_string());
    params.write_to(&mut product)?;
    product.is_active = params.is_active;
    product.updated_at_timestamp = ctx.timestamp();
    product.updated_at_block_number = ctx.block_number();
    batch.save(product);
    Ok(Outcome::Applied)
}

/// Creates the vault on first sighting and overwrites its configuration.
pub(crate) fn vault_updated<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    cap: U256,
    staking_period: u64,
) -> Result<Outcome, IndexerError> {
    let mut vault = batch
        .load::<Vault>(VAULT_ID)
        .unwrap_or_else(|| Vault::new(ctx.instant()));
    vault.cap = num::int(cap)?;
    vault.staking_period = staking_period;
    vault.updated_at_timestamp = ctx.timestamp();
    vault.updated_at_block_number = ctx.block_number();
    batch.save(vault);
    Ok(Outcome::Applied)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reward {
    Protocol,
    Pika,
    Vault,
}

pub(crate) fn reward_distributed<S: Store>(
    batch: &mut Batch<'_, S>,
    reward: Reward,
    amount: U256,
) -> Result<Outcome, IndexerError> {
    let mut vault = require!(batch, Vault, VAULT_ID);
    let amount = num::int(amount)?;
    match reward {
        Reward::Protocol => vault.protocol_reward += amount,
        Reward::Pika => vault.pika_reward += amount,
        Reward::Vault => vault.vault_reward += amount,
    }
    batch.save(vault);
    Ok(Outcome::Applied)
}

/// Records a liquidation payout under the current liquidation counter.
///
/// With `epoch_start` set the rewards also accumulate in the epoch rollup.
pub(crate) fn position_liquidated<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    position_id: U256,
    liquidator: Address,
    liquidator_reward: U256,
    remaining_reward: U256,
    epoch_start: Option<u64>,
) -> Result<Outcome, IndexerError> {
    let mut vault = require!(batch, Vault, VAULT_ID);
    let liquidator_reward = num::int(liquidator_reward)?;
    let remaining_reward = num::int(remaining_reward)?;

    batch.save(Liquidation {
        id: vault.liquidation_count.to_string(),
        tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
        position_id: num::int(position_id)?,
        liquidator: types::account_id(&liquidator),
        liquidator_reward,
        remaining_reward,
        timestamp: ctx.timestamp(),
        block_number: ctx.block_number(),
    });
    vault.liquidation_count += 1;

    let mut day = bucket::day_data(batch, ctx.timestamp());
    day.totals.liquidator_reward += liquidator_reward;
    day.totals.remaining_reward += remaining_reward;
    batch.save(day);

    if let Some(epoch_start) = epoch_start {
        let mut epoch = bucket::epoch_data(batch, ctx.timestamp(), epoch_start);
        epoch.totals.liquidator_reward += liquidator_reward;
        epoch.totals.remaining_reward += remaining_reward;
        batch.save(epoch);
    }

    batch.save(vault);
    Ok(Outcome::Applied)
}

/// Loads a user, registering it with the vault on first sighting.
pub(crate) fn upsert_user<S: Store>(
    batch: &Batch<'_, S>,
    vault: &mut Vault,
    account: &str,
    timestamp: u64,
) -> User {
    batch
        .load::<User>(account)
        .unwrap_or_else(|| User::new(account.to_string(), vault.next_user_number(), timestamp))
}

/// Whether vault deposits maintain the share-weighted deposit time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShareTime {
    Untracked,
    Tracked,
}

pub(crate) fn staked<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    user: Address,
    amount: U256,
    shares: U256,
    share_time: ShareTime,
) -> Result<Outcome, IndexerError> {
    let mut vault = require!(batch, Vault, VAULT_ID);
    let amount = num::int(amount)?;
    let shares = num::int(shares)?;
    let account = types::account_id(&user);

    vault.balance += amount;
    vault.staked += amount;
    vault.shares += shares;

    let mut stake = batch.load::<Stake>(&account).unwrap_or_else(|| Stake {
        id: account.clone(),
        ..Default::default()
    });
    stake.amount += amount;
    stake.shares += shares;
    stake.timestamp = ctx.timestamp();

    let mut user = upsert_user(batch, &mut vault, &account, ctx.timestamp());
    if share_time == ShareTime::Tracked && !shares.is_zero() {
        let now = num::small(ctx.timestamp());
        const WHAT: &str = "average deposit timestamp";
        user.ave_deposit_timestamp = num::div(
            num::add(
                num::mul(user.ave_deposit_timestamp, user.shares, WHAT)?,
                num::mul(now, shares, WHAT)?,
                WHAT,
            )?,
            num::add(user.shares, shares, WHAT)?,
            WHAT,
        )?;
    }
    user.deposit_amount += amount;
    user.shares += shares;
    user.refresh_net_amount();

    batch.save(stake);
    batch.save(user);
    batch.save(vault);
    Ok(Outcome::Applied)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn redeemed<S: Store, T>(
    batch: &mut Batch<'_, S>,
    ctx: &EventContext<T>,
    user: Address,
    amount: U256,
    shares: U256,
    share_balance: U256,
    is_full_redeem: bool,
    share_time: ShareTime,
) -> Result<Outcome, IndexerError> {
    let mut vault = require!(batch, Vault, VAULT_ID);
    let amount = num::int(amount)?;
    let shares = num::int(shares)?;
    let share_balance = num::int(share_balance)?;
    let account = types::account_id(&user);

    vault.staked -= amount;
    vault.shares -= shares;
    vault.balance -= share_balance;
    batch.save(vault);

    if let Some(mut stake) = batch.load::<Stake>(&account) {
        if is_full_redeem {
            batch.remove::<Stake>(&account);
        } else {
            stake.amount -= amount;
            stake.shares -= shares;
            batch.save(stake);
        }
    }

    // Redemptions of accounts never seen depositing still move the vault.
    let Some(mut user) = batch.load::<User>(&account) else {
        return Ok(Outcome::Applied);
    };
    if share_time == ShareTime::Tracked {
        let held = num::small(ctx.timestamp()) - user.ave_deposit_timestamp;
        user.ave_staked_shares += num::div(
            num::mul(held, shares, "staked share time")?,
            num::small(THIRTY_DAYS),
            "staked share time",
        )?;
    }
    user.shares -= shares;
    user.withdraw_amount += share_balance;
    user.refresh_net_amount();
    batch.save(user);
    Ok(Outcome::Applied)
}

/// "Added margin" / "Removed margin" activity of a position owner.
pub(crate) fn margin_activity<T>(
    ctx: &EventContext<T>,
    position: &Position,
    action: &str,
    margin: I256,
) -> Activity {
    Activity {
        id: Activity::make_id(&position.owner, ctx.timestamp(), action, None),
        account: position.owner.clone(),
        action: action.to_string(),
        product_id: position.product_id,
        margin,
        tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
        timestamp: ctx.timestamp(),
        ..Default::default()
    }
}

pub(crate) const LIQUIDATED: &str = "Liquidated";

/// Activity of a position closed by liquidation.
pub(crate) fn liquidated_activity<T>(
    ctx: &EventContext<T>,
    account: &str,
    position: &Position,
    margin: I256,
    size: I256,
    price: I256,
) -> Activity {
    Activity {
        id: Activity::make_id(account, ctx.timestamp(), LIQUIDATED, None),
        account: account.to_string(),
        action: LIQUIDATED.to_string(),
        kind: "market".to_string(),
        product_id: position.product_id,
        is_long: position.is_long,
        margin,
        size,
        price,
        tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
        timestamp: ctx.timestamp(),
    }
}

/// Fields of a `NewPosition` event, decoded to entity units.
#[derive(Clone, Debug)]
pub(crate) struct OpenFill {
    pub position_id: I256,
    pub owner: String,
    pub product_id: I256,
    pub is_long: bool,
    pub price: I256,
    pub oracle_price: I256,
    pub margin: I256,
    pub leverage: I256,
    /// Notional size of the whole position after the open.
    pub amount: I256,
    pub fee: I256,
    pub funding_rate: I256,
}

impl OpenFill {
    pub fn position_key(&self) -> String {
        self.position_id.to_string()
    }

    /// Position as first opened by this fill.
    pub fn new_position<T>(&self, ctx: &EventContext<T>) -> Position {
        Position {
            id: self.position_key(),
            position_id: self.position_id,
            price: self.price,
            created_at_timestamp: ctx.timestamp(),
            created_at_block_number: ctx.block_number(),
            ..Default::default()
        }
    }

    /// Overwrites the position with the fill's post-trade state. The
    /// average entry price is left to the caller.
    pub fn write_to<T>(
        &self,
        ctx: &EventContext<T>,
        position: &mut Position,
        threshold: I256,
    ) -> Result<(), IndexerError> {
        position.owner = self.owner.clone();
        position.product_id = self.product_id;
        position.is_long = self.is_long;
        position.leverage = self.leverage;
        position.oracle_price = self.oracle_price;
        position.margin = self.margin;
        position.amount = self.amount;
        position.funding = self.funding_rate;
        position.liquidation_price =
            num::liquidation_price(position.price, self.leverage, self.is_long, threshold)?;
        position.updated_at_timestamp = ctx.timestamp();
        position.updated_at_block_number = ctx.block_number();
        Ok(())
    }

    pub fn transaction<T>(
        &self,
        ctx: &EventContext<T>,
        count: u64,
        single_amount: I256,
        single_margin: I256,
        fill_price: I256,
    ) -> Transaction {
        Transaction {
            id: Transaction::make_id(self.position_id, &ctx.tx_hash(), count, TxAction::Open),
            tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
            count,
            position_id: self.position_id,
            owner: self.owner.clone(),
            product_id: self.product_id,
            is_long: self.is_long,
            margin: self.margin,
            leverage: self.leverage,
            amount: self.amount,
            single_amount,
            single_margin,
            price: fill_price,
            trade_fee: self.fee,
            timestamp: ctx.timestamp(),
            block_number: ctx.block_number(),
            ..Default::default()
        }
    }
}

/// Fields of a `ClosePosition` event, decoded to entity units.
#[derive(Clone, Debug)]
pub(crate) struct CloseFill {
    pub position_id: I256,
    pub owner: String,
    pub product_id: I256,
    pub price: I256,
    pub entry_price: I256,
    pub margin: I256,
    pub leverage: I256,
    /// Notional size closed.
    pub amount: I256,
    pub fee: I256,
    pub pnl: I256,
    pub funding_payment: I256,
    pub was_liquidated: bool,
}

impl CloseFill {
    pub fn position_key(&self) -> String {
        self.position_id.to_string()
    }

    /// Exact margin equality, any difference is a partial close.
    pub fn is_full_close(&self, position: &Position) -> bool {
        self.margin == position.margin
    }

    /// Fee charged on this close, none for liquidations.
    pub fn transaction_fee(&self) -> I256 {
        if self.was_liquidated {
            I256::ZERO
        } else {
            self.fee
        }
    }

    /// Round-trip fee of the trade: the close fee counted twice, or once
    /// for liquidations.
    pub fn trade_fee(&self) -> Result<I256, IndexerError> {
        if self.was_liquidated {
            Ok(self.fee)
        } else {
            num::mul(self.fee, num::small(2), "trade fee")
        }
    }

    /// Transaction row of the close, on the side opposite to the position.
    pub fn transaction<T>(&self, ctx: &EventContext<T>, count: u64, position: &Position) -> Transaction {
        Transaction {
            id: Transaction::make_id(self.position_id, &ctx.tx_hash(), count, TxAction::Close),
            tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
            count,
            position_id: self.position_id,
            owner: self.owner.clone(),
            product_id: self.product_id,
            is_long: !position.is_long,
            margin: self.margin,
            leverage: self.leverage,
            amount: self.amount,
            single_amount: self.amount,
            single_margin: self.margin,
            price: self.price,
            trade_fee: self.transaction_fee(),
            pnl: self.pnl,
            was_liquidated: self.was_liquidated,
            timestamp: ctx.timestamp(),
            block_number: ctx.block_number(),
        }
    }

    pub fn trade<T>(
        &self,
        ctx: &EventContext<T>,
        trade_id: u64,
        position: &Position,
        pnl_is_negative: bool,
    ) -> Result<Trade, IndexerError> {
        Ok(Trade {
            id: trade_id.to_string(),
            tx_hash: types::tx_hash_hex(&ctx.tx_hash()),
            position_id: self.position_id,
            product_id: self.product_id,
            owner: self.owner.clone(),
            is_long: position.is_long,
            leverage: self.leverage,
            amount: self.amount,
            margin: self.margin,
            entry_price: self.entry_price,
            close_price: self.price,
            pnl: self.pnl,
            pnl_is_negative,
            was_liquidated: self.was_liquidated,
            is_full_close: self.is_full_close(position),
            trade_fee: self.trade_fee()?,
            funding_payment: self.funding_payment,
            timestamp: ctx.timestamp(),
            block_number: ctx.block_number(),
        })
    }

    /// Removes the position on a full close, otherwise shrinks it in place.
    pub fn settle<S: Store, T>(
        &self,
        batch: &mut Batch<'_, S>,
        ctx: &EventContext<T>,
        vault: &mut Vault,
        product: &mut Product,
        mut position: Position,
        threshold: I256,
    ) -> Result<(), IndexerError> {
        if self.is_full_close(&position) {
            batch.remove::<Position>(&position.id);
            vault.position_count = vault.position_count.saturating_sub(1);
            product.position_count = product.position_count.saturating_sub(1);
        } else {
            position.margin -= self.margin;
            position.amount -= self.amount;
            position.liquidation_price = num::liquidation_price(
                position.price,
                position.leverage,
                position.is_long,
                threshold,
            )?;
            position.updated_at_timestamp = ctx.timestamp();
            position.updated_at_block_number = ctx.block_number();
            batch.save(position);
        }
        Ok(())
    }
}

/// Position owner's user row, bumped with per-trade statistics.
pub(crate) fn trader<S: Store>(
    batch: &Batch<'_, S>,
    vault: &mut Vault,
    account: &str,
    timestamp: u64,
) -> User {
    let mut user = upsert_user(batch, vault, account, timestamp);
    user.trade_count += 1;
    user
}
