//! Replayable requests, read responses, and the transport seam.

pub mod request;
pub mod response;
pub mod transport;

pub use request::{ApiRequest, RequestBody};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport};
