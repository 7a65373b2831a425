use crate::{Error, Result};
use bytes::Bytes;
use std::fmt::Debug;

/// HttpSend sends one http request and returns the full response.
///
/// The storage client and the live-check helpers are built on this trait so
/// that callers can plug in their own client, and tests can plug in a mock.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// NoopHttpSend always returns an error.
///
/// Useful when a [`crate::Context`] only signs requests and never sends them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}
