use crate::{Env, FileRead, HttpSend, OsEnv, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Context carries the runtime capabilities every other component needs.
///
/// Credential providers read key files through it, the storage client sends
/// requests through it, and tests swap in static or mock implementations.
/// The environment defaults to the process environment ([`OsEnv`]).
///
/// ## Example
///
/// ```ignore
/// use gcsign_core::Context;
/// use gcsign_file_read_tokio::TokioFileRead;
/// use gcsign_http_send_reqwest::ReqwestHttpSend;
///
/// let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default());
/// ```
#[derive(Clone)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs)
            .field("http", &self.http)
            .field("env", &self.env)
            .finish()
    }
}

impl Context {
    /// Create a new context with the given file reader and http client.
    pub fn new(fs: impl FileRead, http: impl HttpSend) -> Self {
        Self {
            fs: Arc::new(fs),
            http: Arc::new(http),
            env: Arc::new(OsEnv),
        }
    }

    /// Replace the file reader implementation.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the environment implementation.
    ///
    /// Mostly used in tests together with [`crate::StaticEnv`].
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read the file content entirely in `Vec<u8>`.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read the file content entirely in `String`.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Send http request and return the response with a `String` body.
    pub async fn http_send_as_string(
        &self,
        req: http::Request<Bytes>,
    ) -> Result<http::Response<String>> {
        let (parts, body) = self.http.http_send(req).await?.into_parts();
        let body = String::from_utf8_lossy(&body).to_string();
        Ok(http::Response::from_parts(parts, body))
    }

    /// Get the home directory of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// Expand `~` in input path.
    ///
    /// - If path not starts with `~/` or `~\\`, returns `Some(path)` directly.
    /// - Otherwise, replace `~` with home dir instead.
    /// - If home_dir is not found, returns `None`.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        if !path.starts_with("~/") && !path.starts_with("~\\") {
            Some(path.to_string())
        } else {
            self.home_dir()
                .map(|home| path.replace('~', &home.to_string_lossy()))
        }
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoopFileRead, NoopHttpSend, StaticEnv};

    #[test]
    fn test_expand_home_dir() {
        let ctx = Context::new(NoopFileRead, NoopHttpSend).with_env(StaticEnv {
            home_dir: Some(PathBuf::from("/home/alice")),
            envs: HashMap::new(),
        });

        assert_eq!(
            ctx.expand_home_dir("~/keys/sa.pem").as_deref(),
            Some("/home/alice/keys/sa.pem")
        );
        assert_eq!(
            ctx.expand_home_dir("/etc/keys/sa.pem").as_deref(),
            Some("/etc/keys/sa.pem")
        );

        let ctx = ctx.with_env(StaticEnv::default());
        assert_eq!(ctx.expand_home_dir("~/keys/sa.pem"), None);
    }

    #[test]
    fn test_env_var() {
        let ctx = Context::new(NoopFileRead, NoopHttpSend).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from_iter([("GCSIGN_TEST_VAR".to_string(), "on".to_string())]),
        });

        assert_eq!(ctx.env_var("GCSIGN_TEST_VAR").as_deref(), Some("on"));
        assert_eq!(ctx.env_var("GCSIGN_TEST_MISSING"), None);
    }
}
