use std::sync::Arc;

use async_trait::async_trait;

use gcsign_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

use crate::config::Config;
use crate::credential::Credential;
use crate::provide_credential::ConfigCredentialProvider;

/// DefaultCredentialProvider will try to load credential from different sources.
///
/// Resolution order:
///
/// 1. Config values (inline key, key file, service account JSON)
/// 2. Environment variables
/// 3. The well-known gcloud location
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider
    pub fn new(config: Config) -> Self {
        let chain = ProvideCredentialChain::new().push(ConfigCredentialProvider::new(Arc::new(config)));

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// This allows adding a high-priority credential source that will be tried
    /// before all other providers in the default chain.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gcsign_storage::{DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// let provider = DefaultCredentialProvider::default()
    ///     .push_front(StaticCredentialProvider::new("sa@project.iam.gserviceaccount.com", "<pem>"));
    /// ```
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use gcsign_core::StaticEnv;
    use gcsign_file_read_tokio::TokioFileRead;
    use gcsign_http_send_reqwest::ReqwestHttpSend;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_default_loader_without_env() {
        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default()).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::new(),
        });

        let loader = DefaultCredentialProvider::default();
        let credential = loader.provide_credential(&ctx).await.unwrap();

        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_with_env() {
        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default()).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from_iter([
                (
                    GOOGLE_SERVICE_ACCOUNT_EMAIL.to_string(),
                    "sa@test-project.iam.gserviceaccount.com".to_string(),
                ),
                (
                    GOOGLE_PRIVATE_KEY.to_string(),
                    include_str!("../../testdata/test_private_key.pem").to_string(),
                ),
            ]),
        });

        let loader = DefaultCredentialProvider::default();
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(
            "sa@test-project.iam.gserviceaccount.com",
            credential.client_email()
        );
    }

    #[tokio::test]
    async fn test_default_loader_with_push_front() {
        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default()).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::new(),
        });

        let loader = DefaultCredentialProvider::default().push_front(
            crate::provide_credential::StaticCredentialProvider::new(
                "static@test-project.iam.gserviceaccount.com",
                include_str!("../../testdata/test_private_key.pem"),
            ),
        );
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(
            "static@test-project.iam.gserviceaccount.com",
            credential.client_email()
        );
    }
}
