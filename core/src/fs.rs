use crate::{Error, Result};
use std::fmt::Debug;

/// FileRead reads a file's content entirely into a `Vec<u8>`.
///
/// Credential providers use this to load key material from disk without
/// binding the core crate to a particular async runtime.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the file content entirely in `Vec<u8>`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// NoopFileRead always returns an error.
///
/// Useful when a [`crate::Context`] only needs HTTP access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait::async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, _path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(
            "file reading not supported: no file reader configured",
        ))
    }
}
