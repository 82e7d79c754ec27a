//! Event bindings of the indexed contracts.
//!
//! Every contract generation gets its own module so that event payloads which
//! share a name (`NewPosition`, `ClosePosition`, ...) keep their per-generation
//! shape. Only events are declared; decoding is done by the generated
//! `…Events` enums.

#[allow(clippy::too_many_arguments)]
pub mod perp_v1 {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaPerpV1 {
            struct Product {
                address productToken;
                uint256 maxLeverage;
                uint16 fee;
                bool isActive;
                uint64 openInterestLong;
                uint64 openInterestShort;
                uint32 minPriceChange;
                uint32 weight;
                uint64 reserve;
            }

            struct Vault {
                uint256 cap;
                uint256 balance;
                uint256 staked;
                uint256 shares;
                uint64 stakingPeriod;
            }

            event ProductAdded(uint256 productId, Product product);
            event ProductUpdated(uint256 productId, Product product);
            event VaultUpdated(Vault vault);
            event NewPosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                bool isLong,
                uint256 price,
                uint256 margin,
                uint256 leverage,
                uint256 fee
            );
            event AddMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event ClosePosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                uint256 price,
                uint256 entryPrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 pnl,
                bool wasLiquidated
            );
            event PositionLiquidated(
                uint256 indexed positionId,
                address indexed liquidator,
                uint256 liquidatorReward,
                uint256 remainingReward
            );
            event Staked(address indexed user, uint256 amount, uint256 shares);
            event Redeemed(
                address indexed user,
                address indexed receiver,
                uint256 amount,
                uint256 shares,
                uint256 shareBalance,
                bool isFullRedeem
            );
            event OwnerUpdated(address newOwner);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod perp_v2 {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaPerpV2 {
            struct Product {
                address productToken;
                uint256 maxLeverage;
                uint16 fee;
                bool isActive;
                uint64 openInterestLong;
                uint64 openInterestShort;
                uint32 minPriceChange;
                uint32 weight;
                uint64 reserve;
            }

            struct Vault {
                uint256 cap;
                uint256 balance;
                uint256 staked;
                uint256 shares;
                uint64 stakingPeriod;
            }

            event ProductAdded(uint256 productId, Product product);
            event ProductUpdated(uint256 productId, Product product);
            event VaultUpdated(Vault vault);
            event NewPosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                bool isLong,
                uint256 price,
                uint256 oraclePrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee
            );
            event AddMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event ClosePosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                uint256 price,
                uint256 entryPrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 pnl,
                bool wasLiquidated
            );
            event PositionLiquidated(
                uint256 indexed positionId,
                address indexed liquidator,
                uint256 liquidatorReward,
                uint256 remainingReward
            );
            event Staked(address indexed user, uint256 amount, uint256 shares);
            event Redeemed(
                address indexed user,
                address indexed receiver,
                uint256 amount,
                uint256 shares,
                uint256 shareBalance,
                bool isFullRedeem
            );
            event ProtocolRewardDistributed(address to, uint256 amount);
            event PikaRewardDistributed(address to, uint256 amount);
            event VaultRewardDistributed(address to, uint256 amount);
            event OwnerUpdated(address newOwner);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod perp_v3 {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaPerpV3 {
            struct Product {
                address productToken;
                uint256 maxLeverage;
                uint16 fee;
                bool isActive;
                uint64 openInterestLong;
                uint64 openInterestShort;
                uint32 minPriceChange;
                uint32 weight;
                uint64 reserve;
            }

            struct Vault {
                uint256 cap;
                uint256 balance;
                uint256 staked;
                uint256 shares;
                uint64 stakingPeriod;
            }

            event ProductAdded(uint256 productId, Product product);
            event ProductUpdated(uint256 productId, Product product);
            event VaultUpdated(Vault vault);
            event NewPosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                bool isLong,
                uint256 price,
                uint256 oraclePrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 fundingRate
            );
            event AddMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event ClosePosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                uint256 price,
                uint256 entryPrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 pnl,
                int256 fundingPayment,
                bool wasLiquidated
            );
            event PositionLiquidated(
                uint256 indexed positionId,
                address indexed liquidator,
                uint256 liquidatorReward,
                uint256 remainingReward
            );
            event Staked(address indexed user, uint256 amount, uint256 shares);
            event Redeemed(
                address indexed user,
                address indexed receiver,
                uint256 amount,
                uint256 shares,
                uint256 shareBalance,
                bool isFullRedeem
            );
            event ProtocolRewardDistributed(address to, uint256 amount);
            event PikaRewardDistributed(address to, uint256 amount);
            event VaultRewardDistributed(address to, uint256 amount);
            event OwnerUpdated(address newOwner);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod perp_v4 {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaPerpV4 {
            struct Product {
                address productToken;
                uint256 maxLeverage;
                uint16 fee;
                bool isActive;
                uint64 openInterestLong;
                uint64 openInterestShort;
                uint32 minPriceChange;
                uint32 weight;
                uint64 reserve;
                uint16 liquidationThreshold;
            }

            struct Vault {
                uint256 cap;
                uint256 balance;
                uint256 staked;
                uint256 shares;
                uint64 stakingPeriod;
            }

            event ProductAdded(uint256 productId, Product product);
            event ProductUpdated(uint256 productId, Product product);
            event VaultUpdated(Vault vault);
            event NewPosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                bool isLong,
                uint256 price,
                uint256 oraclePrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 fundingRate
            );
            event AddMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event ClosePosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                uint256 price,
                uint256 entryPrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 pnl,
                int256 fundingPayment,
                bool wasLiquidated
            );
            event PositionLiquidated(
                uint256 indexed positionId,
                address indexed liquidator,
                uint256 liquidatorReward,
                uint256 remainingReward
            );
            event Staked(address indexed user, uint256 amount, uint256 shares);
            event Redeemed(
                address indexed user,
                address indexed receiver,
                uint256 amount,
                uint256 shares,
                uint256 shareBalance,
                bool isFullRedeem
            );
            event ProtocolRewardDistributed(address to, uint256 amount);
            event PikaRewardDistributed(address to, uint256 amount);
            event VaultRewardDistributed(address to, uint256 amount);
            event OwnerUpdated(address newOwner);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod perp_v5 {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaPerpV5 {
            struct Product {
                address productToken;
                uint256 maxLeverage;
                uint16 fee;
                bool isActive;
                uint64 openInterestLong;
                uint64 openInterestShort;
                uint32 minPriceChange;
                uint32 weight;
                uint64 reserve;
                uint16 liquidationThreshold;
            }

            struct Vault {
                uint256 cap;
                uint256 balance;
                uint256 staked;
                uint256 shares;
                uint64 stakingPeriod;
            }

            event ProductAdded(uint256 productId, Product product);
            event ProductUpdated(uint256 productId, Product product);
            event VaultUpdated(Vault vault);
            event NewPosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                bool isLong,
                uint256 price,
                uint256 oraclePrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 fundingRate
            );
            event AddMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event RemoveMargin(
                uint256 indexed positionId,
                address indexed user,
                uint256 margin,
                uint256 newMargin,
                uint256 newLeverage
            );
            event ClosePosition(
                uint256 indexed positionId,
                address indexed user,
                uint256 indexed productId,
                uint256 price,
                uint256 entryPrice,
                uint256 margin,
                uint256 leverage,
                uint256 fee,
                int256 pnl,
                int256 fundingPayment,
                bool wasLiquidated
            );
            event PositionLiquidated(
                uint256 indexed positionId,
                address indexed liquidator,
                uint256 liquidatorReward,
                uint256 remainingReward
            );
            event Staked(address indexed user, uint256 amount, uint256 shares);
            event Redeemed(
                address indexed user,
                address indexed receiver,
                uint256 amount,
                uint256 shares,
                uint256 shareBalance,
                bool isFullRedeem
            );
            event ProtocolRewardDistributed(address to, uint256 amount);
            event PikaRewardDistributed(address to, uint256 amount);
            event VaultRewardDistributed(address to, uint256 amount);
            event OwnerUpdated(address newOwner);
        }
    );
}

pub mod fee_reward {
    alloy::sol!(
        #[derive(Debug)]
        interface VaultFeeReward {
            event ClaimedReward(address indexed user, address indexed rewardToken, uint256 amount);
            event Reinvested(address indexed user, uint256 amount);
        }
    );
}

pub mod staking {
    alloy::sol!(
        #[derive(Debug)]
        interface PikaStaking {
            event Staked(address indexed user, uint256 amount);
            event Withdrawn(address indexed user, uint256 amount, uint256 fee);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod order_book {
    alloy::sol!(
        #[derive(Debug)]
        interface OrderBook {
            event CreateOpenOrder(
                address indexed account,
                uint256 orderIndex,
                uint256 productId,
                uint256 margin,
                uint256 leverage,
                uint256 tradeFee,
                bool isLong,
                uint256 triggerPrice,
                bool triggerAboveThreshold,
                uint256 executionFee
            );
            event UpdateOpenOrder(
                address indexed account,
                uint256 orderIndex,
                uint256 margin,
                uint256 leverage,
                uint256 triggerPrice,
                bool triggerAboveThreshold,
                uint256 orderTimestamp
            );
            event CancelOpenOrder(address indexed account, uint256 orderIndex);
            event ExecuteOpenOrder(address indexed account, uint256 orderIndex, uint256 executionPrice);
            event CreateCloseOrder(
                address indexed account,
                uint256 orderIndex,
                uint256 productId,
                uint256 size,
                bool isLong,
                uint256 triggerPrice,
                bool triggerAboveThreshold,
                uint256 executionFee
            );
            event UpdateCloseOrder(
                address indexed account,
                uint256 orderIndex,
                uint256 size,
                uint256 triggerPrice,
                bool triggerAboveThreshold,
                uint256 orderTimestamp
            );
            event CancelCloseOrder(address indexed account, uint256 orderIndex);
            event ExecuteCloseOrder(address indexed account, uint256 orderIndex, uint256 executionPrice);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod position_manager {
    alloy::sol!(
        #[derive(Debug)]
        interface PositionManager {
            event CreateOpenPosition(
                address indexed account,
                uint256 index,
                uint256 productId,
                uint256 margin,
                uint256 leverage,
                uint256 tradeFee,
                bool isLong,
                uint256 acceptablePrice,
                uint256 executionFee,
                uint256 blockNumber,
                uint256 blockTime
            );
            event CreateClosePosition(
                address indexed account,
                uint256 index,
                uint256 productId,
                uint256 margin,
                bool isLong,
                uint256 acceptablePrice,
                uint256 executionFee,
                uint256 blockNumber,
                uint256 blockTime
            );
            event CancelOpenPosition(address indexed account, uint256 index, uint256 blockGap, uint256 timeGap);
            event ExecuteOpenPosition(address indexed account, uint256 index, uint256 blockGap, uint256 timeGap);
            event CancelClosePosition(address indexed account, uint256 index, uint256 blockGap, uint256 timeGap);
            event ExecuteClosePosition(address indexed account, uint256 index, uint256 blockGap, uint256 timeGap);
        }
    );
}

pub mod user_mapping {
    alloy::sol!(
        #[derive(Debug)]
        interface UserMapping {
            event ProxySet(address indexed userAddress, address indexed proxyAddress);
        }
    );
}
