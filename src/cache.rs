use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;

struct Slot<T> {
    data: Option<T>,
    last_fetch: Option<Instant>,
}

/// TTL cache holding the last full read of one sheet.
///
/// The slot is either cold or a complete snapshot; it is never partially
/// updated. Every write path must call `invalidate` for each sheet it
/// touched before reporting success, so the next read observes the write.
/// One instance exists per sheet family (journal, archive); they do not
/// share invalidation.
pub struct SheetCache<T> {
    ttl: Duration,
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> SheetCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(Slot {
                data: None,
                last_fetch: None,
            }),
        }
    }

    /// Returns the cached snapshot, or runs `fetch` and stores the result.
    ///
    /// The bool is true when the snapshot came from the cache. The slot
    /// lock is held across the fetch, so concurrent readers of a cold
    /// cache trigger a single remote read.
    pub async fn get_or_fetch<F, Fut>(&self, force_refresh: bool, fetch: F) -> Result<(T, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;

        if !force_refresh {
            if let (Some(data), Some(at)) = (&slot.data, slot.last_fetch) {
                if at.elapsed() < self.ttl {
                    return Ok((data.clone(), true));
                }
            }
        }

        let data = fetch().await?;
        slot.data = Some(data.clone());
        slot.last_fetch = Some(Instant::now());
        Ok((data, false))
    }

    /// Drops the snapshot so the next read always refetches.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        slot.data = None;
        slot.last_fetch = None;
    }
}
