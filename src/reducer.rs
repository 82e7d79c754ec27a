//! Event reduction contract shared by every indexed contract.

use tracing::{debug, trace, warn};

use crate::{
    error::IndexerError,
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Loads a required entity from a [`Batch`], returning
/// [`Outcome::Skipped`] from the enclosing handler when it is absent.
macro_rules! require {
    ($batch:expr, $ty:ty, $id:expr) => {{
        let id = $id;
        match $batch.load::<$ty>(&id) {
            Some(entity) => entity,
            None => return Ok($crate::types::Outcome::missing::<$ty>(&id)),
        }
    }};
}

pub(crate) use require;

/// Derives entity state from the decoded events of one contract.
pub trait Reducer {
    type Event;

    /// Stages the state changes of a single event.
    ///
    /// Implementations must validate every entity they depend on before
    /// staging anything that would not hold without it; staged writes of an
    /// event that is not [`Outcome::Applied`] are discarded.
    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError>;

    /// Reduces the event and commits its writes to `store` when applied.
    fn apply<S: Store>(
        &self,
        store: &mut S,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        let mut batch = Batch::new(store);
        let outcome = self.reduce(&mut batch, event)?;
        let tx = types::tx_hash_hex(&event.tx_hash());
        match &outcome {
            Outcome::Applied => {
                let writes = batch.commit();
                debug!(block = event.block_number(), %tx, log = event.log_index(), writes, "event applied");
            }
            Outcome::Ignored(reason) => {
                trace!(block = event.block_number(), %tx, log = event.log_index(), reason, "event ignored");
            }
            Outcome::Skipped(missing) => {
                warn!(
                    block = event.block_number(),
                    %tx,
                    log = event.log_index(),
                    entity = %missing.kind,
                    id = %missing.id,
                    "event skipped, entity not found"
                );
            }
        }
        Ok(outcome)
    }
}
