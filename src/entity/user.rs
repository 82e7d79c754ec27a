use alloy::primitives::I256;

/// Lifetime statistics of a trader / vault depositor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub id: String,
    /// Sequence number assigned at first sighting.
    pub user_number: u64,
    pub created_at_timestamp: u64,

    pub trade_count: u64,
    pub volume: I256,
    pub fees: I256,
    pub pnl: I256,

    pub deposit_amount: I256,
    pub withdraw_amount: I256,
    pub shares: I256,
    /// `withdraw_amount - deposit_amount`.
    pub net_amount: I256,
    /// `net_amount + reward`.
    pub net_amount_with_reward: I256,
    pub reward: I256,

    /// Share-weighted mean deposit time of the currently held shares.
    pub ave_deposit_timestamp: I256,
    /// Accrued share-days (in 30-day units) of redeemed shares.
    pub ave_staked_shares: I256,
}

impl User {
    pub fn new(id: String, user_number: u64, timestamp: u64) -> Self {
        Self {
            id,
            user_number,
            created_at_timestamp: timestamp,
            ..Default::default()
        }
    }

    pub fn refresh_net_amount(&mut self) {
        self.net_amount = self.withdraw_amount - self.deposit_amount;
        self.net_amount_with_reward = self.net_amount + self.reward;
    }
}

/// Vault shares staked by one account.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stake {
    pub id: String,
    pub amount: I256,
    pub shares: I256,
    pub timestamp: u64,
}

/// Balance staked with an auxiliary staking contract.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Staker {
    pub id: String,
    pub amount: I256,
}

/// Proxy account registered for a user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserToProxy {
    pub id: String,
    pub proxy: String,
}
