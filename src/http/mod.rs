//! HTTP transport used by the dispatch engine.
mod response;
mod transport;


pub use response::TransportResponse;
pub use transport::{ReqwestTransport, RetryPolicy, Transport, TransportConfig};
