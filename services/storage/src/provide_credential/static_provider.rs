use log::debug;

use gcsign_core::{Context, ProvideCredential, Result};

use crate::credential::Credential;

/// StaticCredentialProvider loads credentials from values provided at
/// construction time.
///
/// The private key is parsed on first use, so a malformed key surfaces as a
/// [`CredentialInvalid`](gcsign_core::ErrorKind::CredentialInvalid) error
/// instead of being silently skipped.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    client_email: String,
    private_key: String,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider from a service account email and
    /// a PEM encoded RSA private key.
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.into(),
        }
    }
}

#[async_trait::async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        debug!("loading credential from static content");

        let cred = Credential::new(&self.client_email, &self.private_key).map_err(|err| {
            debug!("failed to parse static credential: {err:?}");
            err
        })?;

        Ok(Some(cred))
    }
}
