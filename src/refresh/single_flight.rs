use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::RefreshFailure;

type Flight = Shared<BoxFuture<'static, Result<(), RefreshFailure>>>;

/// Slot holding the one outstanding refresh.
///
/// The first caller starts the refresh on its own task; every caller arriving
/// while it is outstanding awaits the same shared handle and gets the same
/// outcome. The task runs to completion even if every caller gives up, and
/// removes itself from the slot as it resolves, so the next expiry starts a
/// new cycle.
#[derive(Clone, Default)]
pub struct RefreshFlight {
    slot: Arc<Mutex<Option<(u64, Flight)>>>,
    started: Arc<AtomicU64>,
}

impl std::fmt::Debug for RefreshFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshFlight")
            .field("in_flight", &self.in_flight())
            .field("started", &self.started())
            .finish()
    }
}

impl RefreshFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the outstanding refresh, or start one with `start`.
    ///
    /// `start` is only called when no refresh is outstanding. Must be called
    /// from within a tokio runtime.
    pub async fn join<F, Fut>(&self, start: F) -> Result<(), RefreshFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), RefreshFailure>> + Send + 'static,
    {
        let flight = {
            let mut slot = lock(&self.slot);
            match slot.as_ref() {
                Some((_, flight)) => flight.clone(),
                None => {
                    let id = self.started.fetch_add(1, Ordering::SeqCst) + 1;
                    let work = start();

                    let task_slot = Arc::clone(&self.slot);
                    let task = tokio::spawn(async move {
                        let outcome = work.await;
                        release(&task_slot, id);
                        outcome
                    });

                    let handle_slot = Arc::clone(&self.slot);
                    let flight = async move {
                        task.await.unwrap_or_else(|error| {
                            release(&handle_slot, id);
                            Err(RefreshFailure::Unreachable(format!(
                                "refresh task failed: {error}"
                            )))
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some((id, flight.clone()));
                    flight
                }
            }
        };
        flight.await
    }

    pub fn in_flight(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Number of refreshes started so far.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }
}

/// Empty the slot if it still holds flight `id`.
fn release(slot: &Mutex<Option<(u64, Flight)>>, id: u64) {
    let mut slot = lock(slot);
    if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
        *slot = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
