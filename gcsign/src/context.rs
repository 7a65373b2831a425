use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use gcsign_core::{Context, Env, Error, FileRead, HttpSend, Result};

/// DefaultContext implements every context capability on top of commonly
/// used components: tokio for file reading, reqwest for HTTP and the
/// process environment.
#[derive(Debug, Default, Clone)]
pub struct DefaultContext {
    client: Client,
}

impl DefaultContext {
    /// Create a new default context implementation.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use an already configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Create a [`Context`] wired with the default implementations.
pub fn default_context() -> Context {
    let d = DefaultContext::new();
    Context::new(d.clone(), d.clone()).with_env(d)
}

#[async_trait]
impl FileRead for DefaultContext {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}

#[async_trait]
impl HttpSend for DefaultContext {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = reqwest::Request::try_from(req)
            .map_err(|e| Error::unexpected("request is not valid for reqwest").with_source(e))?;

        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport_failed("failed to send http request").with_source(e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::transport_failed("failed to read response body").with_source(e))?;

        let mut builder = http::Response::builder().status(status);
        if let Some(h) = builder.headers_mut() {
            *h = headers;
        }

        Ok(builder.body(body)?)
    }
}

impl Env for DefaultContext {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir()
    }
}
