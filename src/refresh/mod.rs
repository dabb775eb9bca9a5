//! Expired-session interception with single-flight refresh.

pub mod coordinator;
pub mod exclusion;
pub mod single_flight;

pub use coordinator::{Interception, PassReason, RefreshCoordinator};
pub use exclusion::ExclusionList;
pub use single_flight::RefreshFlight;
