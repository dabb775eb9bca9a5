//! Session state and the store that shares it.

pub mod state;
pub mod store;

pub use state::{Role, SessionState};
pub use store::{SessionStore, SubscriptionId};
