use alloy::primitives::I256;

/// Lifecycle state of an order. `Executed` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Open,
    Executed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Executed => "executed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }
}

/// Trigger order classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderKind {
    #[default]
    Limit,
    StopMarket,
}

impl OrderKind {
    /// Classifies a trigger order by side, direction and trigger direction.
    ///
    /// An order is a limit order when it triggers on a price move in the
    /// trader's favour relative to the action: opening a long (or closing a
    /// short) below the threshold, opening a short (or closing a long) above.
    pub fn classify(is_open: bool, is_long: bool, trigger_above_threshold: bool) -> Self {
        match (is_open, is_long, trigger_above_threshold) {
            (true, true, false)
            | (true, false, true)
            | (false, true, true)
            | (false, false, false) => OrderKind::Limit,
            _ => OrderKind::StopMarket,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Limit => "limit",
            OrderKind::StopMarket => "stopMarket",
        }
    }
}

/// `account-isOpen-index`, shared by trigger and market orders.
pub fn order_id(account: &str, is_open: bool, index: I256) -> String {
    format!("{account}-{is_open}-{index}")
}

/// Limit/trigger order placed on the order book.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Order {
    pub id: String,
    pub account: String,
    pub index: I256,
    pub is_open: bool,
    pub product_id: I256,
    pub status: OrderStatus,
    pub kind: OrderKind,
    pub is_long: bool,
    pub margin: I256,
    pub leverage: I256,
    pub size: I256,
    pub trade_fee: I256,
    pub trigger_price: I256,
    pub trigger_above_threshold: bool,
    pub execution_fee: I256,
    pub execution_price: I256,
    pub created_timestamp: u64,
    pub updated_timestamp: u64,
    pub cancelled_timestamp: u64,
    pub executed_timestamp: u64,
}

/// Market order request queued with the position manager.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketOrder {
    pub id: String,
    pub account: String,
    pub index: I256,
    pub is_open: bool,
    pub product_id: I256,
    pub status: OrderStatus,
    pub is_long: bool,
    pub margin: I256,
    pub leverage: I256,
    pub size: I256,
    pub trade_fee: I256,
    pub acceptable_price: I256,
    pub execution_fee: I256,
    pub created_block_number: I256,
    pub created_timestamp: I256,
    pub cancelled_block_gap: I256,
    pub cancelled_time_gap: I256,
    pub executed_block_gap: I256,
    pub executed_time_gap: I256,
}

/// Id of the order statistics singleton.
pub const ORDER_STAT_ID: &str = "1";

/// Counter tracked by [`OrderStat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderCounter {
    CreateOpenTrigger,
    CreateCloseTrigger,
    CancelledOpenTrigger,
    CancelledCloseTrigger,
    ExecutedOpenTrigger,
    ExecutedCloseTrigger,
    CreateOpenMarket,
    CreateCloseMarket,
    CancelledOpenMarket,
    CancelledCloseMarket,
    ExecutedOpenMarket,
    ExecutedCloseMarket,
}

/// Order lifecycle counters. `create_*` counters hold the number of
/// currently open orders per category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderStat {
    pub id: String,
    pub create_open_trigger: i64,
    pub create_close_trigger: i64,
    pub cancelled_open_trigger: i64,
    pub cancelled_close_trigger: i64,
    pub executed_open_trigger: i64,
    pub executed_close_trigger: i64,
    pub create_open_market: i64,
    pub create_close_market: i64,
    pub cancelled_open_market: i64,
    pub cancelled_close_market: i64,
    pub executed_open_market: i64,
    pub executed_close_market: i64,
}

impl OrderStat {
    pub fn new() -> Self {
        Self {
            id: ORDER_STAT_ID.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, counter: OrderCounter) -> i64 {
        match counter {
            OrderCounter::CreateOpenTrigger => self.create_open_trigger,
            OrderCounter::CreateCloseTrigger => self.create_close_trigger,
            OrderCounter::CancelledOpenTrigger => self.cancelled_open_trigger,
            OrderCounter::CancelledCloseTrigger => self.cancelled_close_trigger,
            OrderCounter::ExecutedOpenTrigger => self.executed_open_trigger,
            OrderCounter::ExecutedCloseTrigger => self.executed_close_trigger,
            OrderCounter::CreateOpenMarket => self.create_open_market,
            OrderCounter::CreateCloseMarket => self.create_close_market,
            OrderCounter::CancelledOpenMarket => self.cancelled_open_market,
            OrderCounter::CancelledCloseMarket => self.cancelled_close_market,
            OrderCounter::ExecutedOpenMarket => self.executed_open_market,
            OrderCounter::ExecutedCloseMarket => self.executed_close_market,
        }
    }

    fn counter_mut(&mut self, counter: OrderCounter) -> &mut i64 {
        match counter {
            OrderCounter::CreateOpenTrigger => &mut self.create_open_trigger,
            OrderCounter::CreateCloseTrigger => &mut self.create_close_trigger,
            OrderCounter::CancelledOpenTrigger => &mut self.cancelled_open_trigger,
            OrderCounter::CancelledCloseTrigger => &mut self.cancelled_close_trigger,
            OrderCounter::ExecutedOpenTrigger => &mut self.executed_open_trigger,
            OrderCounter::ExecutedCloseTrigger => &mut self.executed_close_trigger,
            OrderCounter::CreateOpenMarket => &mut self.create_open_market,
            OrderCounter::CreateCloseMarket => &mut self.create_close_market,
            OrderCounter::CancelledOpenMarket => &mut self.cancelled_open_market,
            OrderCounter::CancelledCloseMarket => &mut self.cancelled_close_market,
            OrderCounter::ExecutedOpenMarket => &mut self.executed_open_market,
            OrderCounter::ExecutedCloseMarket => &mut self.executed_close_market,
        }
    }

    /// Increments one counter and optionally decrements its paired counter.
    pub fn bump(&mut self, increment: OrderCounter, decrement: Option<OrderCounter>) {
        *self.counter_mut(increment) += 1;
        if let Some(counter) = decrement {
            *self.counter_mut(counter) -= 1;
        }
    }
}

/// Append-only user-facing action log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Activity {
    pub id: String,
    pub account: String,
    pub action: String,
    /// Order type the action relates to, empty when not applicable.
    pub kind: String,
    pub product_id: I256,
    pub is_long: bool,
    pub margin: I256,
    pub size: I256,
    pub price: I256,
    pub tx_hash: String,
    pub timestamp: u64,
}

impl Activity {
    /// `account + timestamp + action[+type]`.
    pub fn make_id(account: &str, timestamp: u64, action: &str, kind: Option<&str>) -> String {
        format!("{account}{timestamp}{action}{}", kind.unwrap_or_default())
    }
}
