use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::state::{Role, SessionState};

type Callback = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared session state container.
///
/// Cloning yields another handle to the same state. Every mutation is applied
/// under a single lock, normalised so an anonymous state never carries a role
/// or verification flag, and then delivered to subscribers exactly once.
/// Notifications are serialised, so subscribers see updates in call order.
///
/// Subscribers may read the store but must not mutate it from inside the
/// callback.
///
/// # Example
/// ```
/// use authgate::session::{Role, SessionStore};
///
/// let store = SessionStore::new();
/// store.set_authenticated(true);
/// store.set_role(Some(Role::User));
/// store.reset();
/// assert_eq!(store.get().role, None);
/// ```
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    tracked: Mutex<Tracked>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_subscription: AtomicU64,
    delivery: Mutex<()>,
}

#[derive(Default)]
struct Tracked {
    state: SessionState,
    generation: u64,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracked = lock(&self.inner.tracked);
        f.debug_struct("SessionStore")
            .field("state", &tracked.state)
            .field("generation", &tracked.generation)
            .field("subscribers", &lock(&self.inner.subscribers).len())
            .finish()
    }
}

impl SessionStore {
    /// A fresh store: loading, anonymous, generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SessionState {
        lock(&self.inner.tracked).state.clone()
    }

    /// Current generation. Bumped by [`reset`](Self::reset) and
    /// [`begin_login`](Self::begin_login).
    pub fn generation(&self) -> u64 {
        lock(&self.inner.tracked).generation
    }

    /// Setting `false` drops the role and verification flag in the same update.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.mutate(|tracked| tracked.state.authenticated = authenticated);
    }

    pub fn set_email_verified(&self, email_verified: bool) {
        self.mutate(|tracked| tracked.state.email_verified = email_verified);
    }

    pub fn set_role(&self, role: Option<Role>) {
        self.mutate(|tracked| tracked.state.role = role);
    }

    /// Set the role from a raw backend value, coercing unknown names to `None`.
    pub fn set_role_raw(&self, raw: Option<&str>) {
        self.set_role(Role::coerce(raw));
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(|tracked| tracked.state.loading = loading);
    }

    pub fn set_login_flow_completed(&self, completed: bool) {
        self.mutate(|tracked| tracked.state.login_flow_completed = completed);
    }

    /// Return to the logged-out state in one observable update.
    pub fn reset(&self) {
        self.mutate(|tracked| {
            tracked.state.clear_identity();
            tracked.generation += 1;
        });
    }

    /// [`reset`](Self::reset), unless a reset or login happened since
    /// `generation` was captured. Returns whether the reset was applied.
    pub fn reset_if_current(&self, generation: u64) -> bool {
        let mut applied = false;
        self.mutate(|tracked| {
            if tracked.generation == generation {
                tracked.state.clear_identity();
                tracked.generation += 1;
                applied = true;
            }
        });
        applied
    }

    /// Mark the start of a login sequence and return its generation.
    pub fn begin_login(&self) -> u64 {
        let mut generation = 0;
        self.mutate(|tracked| {
            tracked.generation += 1;
            tracked.state.login_flow_completed = false;
            generation = tracked.generation;
        });
        generation
    }

    /// Apply `update` only if no reset or login started since `generation` was
    /// captured. Returns whether the update was applied.
    pub fn update_if_current(
        &self,
        generation: u64,
        update: impl FnOnce(&mut SessionState),
    ) -> bool {
        let _delivery = lock(&self.inner.delivery);
        let snapshot = {
            let mut tracked = lock(&self.inner.tracked);
            if tracked.generation != generation {
                return false;
            }
            update(&mut tracked.state);
            tracked.state.normalize();
            tracked.state.clone()
        };
        self.deliver(&snapshot);
        true
    }

    /// Register an observer called after every mutation.
    pub fn subscribe(
        &self,
        callback: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.subscribers).push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    fn mutate(&self, update: impl FnOnce(&mut Tracked)) {
        let _delivery = lock(&self.inner.delivery);
        let snapshot = {
            let mut tracked = lock(&self.inner.tracked);
            update(&mut tracked);
            tracked.state.normalize();
            tracked.state.clone()
        };
        self.deliver(&snapshot);
    }

    fn deliver(&self, snapshot: &SessionState) {
        let callbacks: Vec<Callback> = lock(&self.inner.subscribers)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
