use std::time::Duration;

use alloy::{
    providers::Provider,
    rpc::types::{Filter, Log},
};
use futures::{Stream, stream};
use tracing::trace;

use crate::{
    Deployment,
    error::IndexerError,
    indexer::{SourceBlockEvents, SourceEvent},
    types::{self, BlockInstant},
};

/// Returns stream of decoded events emitted by the contracts of the
/// deployment, batched per block, starting from the specified block.
///
/// Polls logs via the given [`Provider`] to produce strictly continuous
/// block sequence, with [`Provider`]-configured interval. Blocks without
/// events of interest are yielded empty.
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::RetryBackoffLayer`].
pub fn logs<P, S, SFut>(
    deployment: &Deployment,
    provider: P,
    from_block: u64,
    sleep: S,
) -> impl Stream<Item = Result<SourceBlockEvents, IndexerError>>
where
    P: Provider,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    stream::unfold(
        (provider, from_block),
        move |(provider, mut block_num)| async move {
            loop {
                let result = block_events(deployment, &provider, block_num).await;
                if result.is_ok() {
                    block_num += 1;
                    return Some((result, (provider, block_num)));
                }
                if matches!(result, Err(IndexerError::InvalidRequest(_))) {
                    // Block is not available yet
                    sleep(provider.client().poll_interval()).await;
                    continue;
                }
                return Some((result, (provider, block_num)));
            }
        },
    )
}

async fn block_events<P: Provider>(
    deployment: &Deployment,
    provider: &P,
    block_num: u64,
) -> Result<SourceBlockEvents, IndexerError> {
    let filter = Filter::new()
        .address(deployment.addresses())
        .from_block(block_num)
        .to_block(block_num);
    // Some RPC providers produce empty response instead of error
    // in case the block in the filter does not exist yet
    let (head_block_num, logs) =
        futures::try_join!(provider.get_block_number(), provider.get_logs(&filter))?;
    if head_block_num < block_num {
        return Err(IndexerError::InvalidRequest(
            "block is not available yet".to_string(),
        ));
    }

    let timestamp = block_timestamp(provider, block_num, &logs).await?;
    let instant = BlockInstant::new(block_num, timestamp);
    let mut events = Vec::with_capacity(logs.len());
    for log in &logs {
        let Some(contract) = deployment.contract_at(log.address()) else {
            continue;
        };
        let Some(event) = SourceEvent::decode(contract, &log.inner)? else {
            trace!(block = block_num, ?contract, "log without reducer");
            continue;
        };
        events.push(types::EventContext::new(
            instant,
            log.transaction_hash.unwrap_or_default(),
            log.log_index.unwrap_or_default(),
            event,
        ));
    }
    Ok(SourceBlockEvents::new(instant, events))
}

/// Timestamp of the block the logs were emitted in.
///
/// `blockTimestamp` is optional in `eth_getLogs` responses, the block header
/// is fetched when any log lacks it. Blocks without logs are not reduced and
/// keep a zero timestamp.
async fn block_timestamp<P: Provider>(
    provider: &P,
    block_num: u64,
    logs: &[Log],
) -> Result<u64, IndexerError> {
    if logs.is_empty() {
        return Ok(0);
    }
    if let Some(ts) = logs
        .iter()
        .map(|l| l.block_timestamp)
        .collect::<Option<Vec<_>>>()
        .and_then(|ts| ts.first().copied())
    {
        return Ok(ts);
    }
    trace!(block = block_num, "logs without block timestamp, fetching header");
    let header = provider
        .get_block_by_number(block_num.into())
        .await?
        .map(|b| b.into_header())
        .ok_or(IndexerError::NullResp)?;
    Ok(header.timestamp)
}
