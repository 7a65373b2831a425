use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use gcsign_core::{Context, ProvideCredential, Result};

use crate::config::Config;
use crate::credential::{Credential, CredentialFile};

/// ConfigCredentialProvider will load credential from config.
///
/// Sources are tried in order:
///
/// 1. Inline `client_email` and `private_key`
/// 2. `private_key_path` beside `client_email`
/// 3. Service account JSON key file at `credential_path`
/// 4. Service account JSON key file at the well-known gcloud location
///
/// Values missing from the config are first filled from the environment via
/// [`Config::from_env`] unless `disable_env` is set. Explicitly configured
/// sources fail loudly when unreadable or malformed; the well-known location
/// is skipped quietly since it commonly holds credential types without a
/// private key.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new loader via config.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        // Load config from environment
        let config = if self.config.disable_env {
            self.config.as_ref().clone()
        } else {
            self.config.as_ref().clone().from_env(ctx)
        };

        if let Some(email) = &config.client_email {
            if let Some(pem) = &config.private_key {
                debug!("loading credential from config private_key");
                return Credential::new(email, pem).map(Some);
            }

            if let Some(path) = &config.private_key_path {
                debug!("loading credential from private key file {path}");
                let pem = ctx.file_read_as_string(path).await?;
                return Credential::new(email, &pem).map(Some);
            }
        }

        if let Some(path) = &config.credential_path {
            debug!("loading credential from file {path}");
            let content = ctx.file_read(path).await?;
            let CredentialFile::ServiceAccount(sa) = CredentialFile::from_slice(&content)?;
            return Credential::from_service_account(&sa).map(Some);
        }

        if !config.disable_well_known_location {
            if let Some(path) = well_known_location(ctx) {
                if let Ok(content) = ctx.file_read(&path).await {
                    if let Ok(CredentialFile::ServiceAccount(sa)) =
                        CredentialFile::from_slice(&content)
                    {
                        debug!("loading credential from well-known location {path}");
                        return Credential::from_service_account(&sa).map(Some);
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Well known locations:
///
/// - `$HOME/.config/gcloud/application_default_credentials.json`
/// - `%APPDATA%\gcloud\application_default_credentials.json`
fn well_known_location(ctx: &Context) -> Option<String> {
    let config_dir = if let Some(v) = ctx.env_var("APPDATA") {
        v
    } else if let Some(v) = ctx.env_var("XDG_CONFIG_HOME") {
        v
    } else if let Some(v) = ctx.env_var("HOME") {
        format!("{v}/.config")
    } else {
        // User's env doesn't have a config dir.
        return None;
    };

    Some(format!(
        "{config_dir}/gcloud/application_default_credentials.json"
    ))
}
