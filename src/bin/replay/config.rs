//! Configuration for the replay binary.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): RPC endpoint, deployment
//! - CLI arguments: block range and output options
//!
//! Reducer parameters (epochs, campaign windows) are read separately by
//! [`perp_indexer::config::IndexerConfig::from_env`].

use alloy::primitives::{Address, hex::FromHexError};
use clap::Parser;
use perp_indexer::{Contract, Deployment};
use url::Url;

/// Environment configuration (connection details, contract addresses).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL for the node
    pub node_rpc_url: String,

    /// Block of the earliest indexed contract deployment
    pub deployed_at_block: u64,

    pub perp_v1_address: Option<String>,
    pub perp_v2_address: Option<String>,
    pub perp_v3_address: Option<String>,
    pub perp_v4_address: Option<String>,
    pub perp_v5_address: Option<String>,
    pub fee_reward_address: Option<String>,
    pub staking_v1_address: Option<String>,
    pub staking_v2_address: Option<String>,
    pub order_book_address: Option<String>,
    pub position_manager_address: Option<String>,
    pub user_mapping_address: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn node_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.node_rpc_url)
    }

    /// Deployment made of every contract with a configured address.
    pub fn deployment(&self) -> Result<Deployment, ConfigError> {
        let contracts = [
            (&self.perp_v1_address, Contract::PerpV1),
            (&self.perp_v2_address, Contract::PerpV2),
            (&self.perp_v3_address, Contract::PerpV3),
            (&self.perp_v4_address, Contract::PerpV4),
            (&self.perp_v5_address, Contract::PerpV5),
            (&self.fee_reward_address, Contract::FeeReward),
            (&self.staking_v1_address, Contract::StakingV1),
            (&self.staking_v2_address, Contract::StakingV2),
            (&self.order_book_address, Contract::OrderBook),
            (&self.position_manager_address, Contract::PositionManager),
            (&self.user_mapping_address, Contract::UserMapping),
        ];
        let mut deployment = Deployment::new(self.deployed_at_block);
        for (address, contract) in contracts {
            if let Some(address) = address {
                let address: Address = address
                    .parse()
                    .map_err(|e: FromHexError| ConfigError::InvalidAddress(contract, e))?;
                deployment = deployment.with(address, contract);
            }
        }
        if deployment.is_empty() {
            return Err(ConfigError::NoContracts);
        }
        Ok(deployment)
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "replay")]
#[command(about = "Replay Pika protocol events into an in-memory store")]
pub struct CliConfig {
    /// First block to replay, defaults to the deployment block
    #[arg(long)]
    pub from_block: Option<u64>,

    /// Number of blocks to replay, follows the chain head if not set
    #[arg(long)]
    pub blocks: Option<usize>,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "500")]
    pub poll_interval: u64,

    /// Print store summary every N applied blocks (0 = only at the end)
    #[arg(long, default_value = "1000")]
    pub summary_every: u64,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid address for {0:?}: {1}")]
    InvalidAddress(Contract, FromHexError),

    #[error("No contract address configured")]
    NoContracts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(perp_v3: Option<&str>) -> EnvConfig {
        EnvConfig {
            node_rpc_url: "http://localhost:8545".to_string(),
            deployed_at_block: 7,
            perp_v1_address: None,
            perp_v2_address: None,
            perp_v3_address: perp_v3.map(str::to_string),
            perp_v4_address: None,
            perp_v5_address: None,
            fee_reward_address: None,
            staking_v1_address: None,
            staking_v2_address: None,
            order_book_address: None,
            position_manager_address: None,
            user_mapping_address: None,
        }
    }

    #[test]
    fn test_deployment_from_env() {
        let deployment = env(Some("0x1111111111111111111111111111111111111111"))
            .deployment()
            .unwrap();
        assert_eq!(deployment.deployed_at_block(), 7);
        assert_eq!(
            deployment.contract_at(Address::repeat_byte(0x11)),
            Some(Contract::PerpV3)
        );
    }

    #[test]
    fn test_deployment_errors() {
        assert!(matches!(env(None).deployment(), Err(ConfigError::NoContracts)));
        assert!(matches!(
            env(Some("0x12")).deployment(),
            Err(ConfigError::InvalidAddress(Contract::PerpV3, _))
        ));
    }
}
