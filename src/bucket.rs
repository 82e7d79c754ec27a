//! Day and epoch rollup buckets.

use crate::{
    entity::{VaultDayData, VaultEpochData},
    store::{Batch, Store},
};

pub const DAY_SECONDS: u64 = 86_400;

/// Length of an epoch bucket, also the unit of staked share-time accrual.
pub const THIRTY_DAYS: u64 = 2_592_000;

/// Day bucket index of a timestamp.
pub fn day_id(timestamp: u64) -> u64 {
    timestamp / DAY_SECONDS
}

/// Number of whole epochs elapsed since `epoch_start`, zero before it.
pub fn epoch_id(timestamp: u64, epoch_start: u64) -> u64 {
    timestamp.saturating_sub(epoch_start) / THIRTY_DAYS
}

/// Loads the day bucket containing `timestamp`, creating it when absent.
///
/// A created bucket only reaches the store if the caller saves it.
pub fn day_data<S: Store>(batch: &Batch<'_, S>, timestamp: u64) -> VaultDayData {
    let day = day_id(timestamp);
    let id = day.to_string();
    batch
        .load::<VaultDayData>(&id)
        .unwrap_or_else(|| VaultDayData {
            id,
            date: day * DAY_SECONDS,
            ..Default::default()
        })
}

/// Loads the epoch bucket containing `timestamp`, creating it when absent.
pub fn epoch_data<S: Store>(
    batch: &Batch<'_, S>,
    timestamp: u64,
    epoch_start: u64,
) -> VaultEpochData {
    let epoch = epoch_id(timestamp, epoch_start);
    let id = epoch.to_string();
    batch
        .load::<VaultEpochData>(&id)
        .unwrap_or_else(|| VaultEpochData {
            id,
            epoch,
            start_timestamp: epoch_start + epoch * THIRTY_DAYS,
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_day_id() {
        assert_eq!(day_id(0), 0);
        assert_eq!(day_id(86_399), 0);
        assert_eq!(day_id(86_400), 1);
        assert_eq!(day_id(1_681_084_800), 19_457);
    }

    #[test]
    fn test_epoch_id() {
        let start = 1_688_169_600;
        assert_eq!(epoch_id(start - 1, start), 0);
        assert_eq!(epoch_id(start, start), 0);
        assert_eq!(epoch_id(start + THIRTY_DAYS - 1, start), 0);
        assert_eq!(epoch_id(start + THIRTY_DAYS, start), 1);
        assert_eq!(epoch_id(start + 5 * THIRTY_DAYS + 7, start), 5);
    }

    #[test]
    fn test_buckets_are_created_lazily() {
        let mut store = MemoryStore::new();
        let mut batch = Batch::new(&mut store);

        let mut day = day_data(&batch, 86_400 * 3 + 17);
        assert_eq!(day.id, "3");
        assert_eq!(day.date, 86_400 * 3);
        day.totals.tx_count = 1;
        batch.save(day);

        let day = day_data(&batch, 86_400 * 3 + 500);
        assert_eq!(day.totals.tx_count, 1);

        let epoch = epoch_data(&batch, 1_000 + 2 * THIRTY_DAYS, 1_000);
        assert_eq!(epoch.id, "2");
        assert_eq!(epoch.start_timestamp, 1_000 + 2 * THIRTY_DAYS);

        batch.commit();
        assert_eq!(store.len(), 1);
    }
}
