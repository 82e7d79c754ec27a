use crate::{
    abi::user_mapping::UserMapping::UserMappingEvents,
    entity::UserToProxy,
    error::IndexerError,
    reducer::Reducer,
    store::{Batch, Store},
    types::{self, EventContext, Outcome},
};

/// Records the proxy registered for a user.
///
/// The first registration wins; later `ProxySet` events for the same user
/// are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserMapping;

impl Reducer for UserMapping {
    type Event = UserMappingEvents;

    fn reduce<S: Store>(
        &self,
        batch: &mut Batch<'_, S>,
        event: &EventContext<Self::Event>,
    ) -> Result<Outcome, IndexerError> {
        let UserMappingEvents::ProxySet(e) = event.event();
        let id = types::account_id(&e.userAddress);
        if batch.exists::<UserToProxy>(&id) {
            return Ok(Outcome::Ignored("proxy already set"));
        }
        batch.save(UserToProxy {
            id,
            proxy: types::account_id(&e.proxyAddress),
        });
        Ok(Outcome::Applied)
    }
}
