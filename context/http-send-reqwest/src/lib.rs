//! Reqwest-based HTTP client implementation for gcsign.
//!
//! This crate provides `ReqwestHttpSend`, which implements the `HttpSend`
//! trait from `gcsign_core` on top of `reqwest::Client`. The storage client
//! uses it to issue signed requests against the XML API.
//!
//! ## Example
//!
//! ```no_run
//! use gcsign_core::{Context, NoopFileRead};
//! use gcsign_http_send_reqwest::ReqwestHttpSend;
//! use reqwest::Client;
//!
//! // With the default client
//! let ctx = Context::new(NoopFileRead, ReqwestHttpSend::default());
//!
//! // Or with a custom configured client
//! let client = Client::builder().use_rustls_tls().build().unwrap();
//! let ctx = Context::new(NoopFileRead, ReqwestHttpSend::new(client));
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use gcsign_core::{Error, HttpSend, Result};
use http_body_util::BodyExt;
use reqwest::{Client, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::unexpected("request is not valid for reqwest").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport_failed("failed to send http request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport_failed("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
