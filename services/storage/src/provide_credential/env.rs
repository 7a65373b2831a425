use async_trait::async_trait;

use gcsign_core::{Context, ProvideCredential, Result};

use crate::constants::*;
use crate::credential::Credential;

/// EnvCredentialProvider loads Google Cloud credentials from environment
/// variables.
///
/// This provider looks for the following environment variables:
/// - `GOOGLE_SERVICE_ACCOUNT_EMAIL`: The service account email
/// - `GOOGLE_PRIVATE_KEY`: The PEM encoded RSA private key
/// - `GOOGLE_PRIVATE_KEY_PATH`: Path to a PEM encoded RSA private key,
///   consulted when `GOOGLE_PRIVATE_KEY` is not set
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let Some(client_email) = envs.get(GOOGLE_SERVICE_ACCOUNT_EMAIL) else {
            return Ok(None);
        };

        if let Some(pem) = envs.get(GOOGLE_PRIVATE_KEY) {
            return Credential::new(client_email, pem).map(Some);
        }

        if let Some(path) = envs.get(GOOGLE_PRIVATE_KEY_PATH) {
            let pem = ctx.file_read_as_string(path).await?;
            return Credential::new(client_email, &pem).map(Some);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcsign_core::StaticEnv;
    use gcsign_file_read_tokio::TokioFileRead;
    use gcsign_http_send_reqwest::ReqwestHttpSend;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider() -> anyhow::Result<()> {
        let envs = HashMap::from([
            (
                GOOGLE_SERVICE_ACCOUNT_EMAIL.to_string(),
                "sa@test-project.iam.gserviceaccount.com".to_string(),
            ),
            (
                GOOGLE_PRIVATE_KEY.to_string(),
                include_str!("../../testdata/test_private_key.pem").to_string(),
            ),
        ]);

        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default())
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_some());
        let cred = cred.unwrap();
        assert_eq!(cred.client_email(), "sa@test-project.iam.gserviceaccount.com");

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_with_key_path() -> anyhow::Result<()> {
        let envs = HashMap::from([
            (
                GOOGLE_SERVICE_ACCOUNT_EMAIL.to_string(),
                "sa@test-project.iam.gserviceaccount.com".to_string(),
            ),
            (
                GOOGLE_PRIVATE_KEY_PATH.to_string(),
                format!("{}/testdata/test_private_key.pem", env!("CARGO_MANIFEST_DIR")),
            ),
        ]);

        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default())
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_missing_credentials() -> anyhow::Result<()> {
        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default())
            .with_env(StaticEnv {
                home_dir: None,
                envs: HashMap::new(),
            });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_env_credential_provider_email_only() -> anyhow::Result<()> {
        let envs = HashMap::from([(
            GOOGLE_SERVICE_ACCOUNT_EMAIL.to_string(),
            "sa@test-project.iam.gserviceaccount.com".to_string(),
        )]);

        let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default())
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await?;
        assert!(cred.is_none());

        Ok(())
    }
}
