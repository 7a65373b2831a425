use std::fmt::{Debug, Formatter};

use gcsign_core::utils::Redact;
use gcsign_core::Context;

use super::constants::*;

/// Config carries all the configuration for Google Cloud Storage services.
#[derive(Clone, Default)]
pub struct Config {
    /// `client_email` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GOOGLE_SERVICE_ACCOUNT_EMAIL`]
    pub client_email: Option<String>,
    /// `private_key` holds the PEM encoded RSA private key and will be
    /// loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GOOGLE_PRIVATE_KEY`]
    pub private_key: Option<String>,
    /// `private_key_path` points to a PEM file and will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GOOGLE_PRIVATE_KEY_PATH`]
    pub private_key_path: Option<String>,
    /// `credential_path` points to a service account JSON key file and will
    /// be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`GOOGLE_APPLICATION_CREDENTIALS`]
    pub credential_path: Option<String>,
    /// Disable reading from environment variables.
    pub disable_env: bool,
    /// Disable reading from the well-known gcloud location.
    pub disable_well_known_location: bool,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client_email
    pub fn with_client_email(mut self, client_email: impl Into<String>) -> Self {
        self.client_email = Some(client_email.into());
        self
    }

    /// Set private_key
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// Set private_key_path
    pub fn with_private_key_path(mut self, private_key_path: impl Into<String>) -> Self {
        self.private_key_path = Some(private_key_path.into());
        self
    }

    /// Set credential_path
    pub fn with_credential_path(mut self, credential_path: impl Into<String>) -> Self {
        self.credential_path = Some(credential_path.into());
        self
    }

    /// Disable reading from environment variables.
    pub fn with_disable_env(mut self) -> Self {
        self.disable_env = true;
        self
    }

    /// Disable reading from the well-known gcloud location.
    pub fn with_disable_well_known_location(mut self) -> Self {
        self.disable_well_known_location = true;
        self
    }

    /// Load config from env.
    ///
    /// Values already present on the config take priority over env values.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(GOOGLE_SERVICE_ACCOUNT_EMAIL) {
            self.client_email.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GOOGLE_PRIVATE_KEY) {
            self.private_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GOOGLE_PRIVATE_KEY_PATH) {
            self.private_key_path.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(GOOGLE_APPLICATION_CREDENTIALS) {
            self.credential_path.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(Redact::from))
            .field("private_key_path", &self.private_key_path)
            .field("credential_path", &self.credential_path)
            .field("disable_env", &self.disable_env)
            .field(
                "disable_well_known_location",
                &self.disable_well_known_location,
            )
            .finish()
    }
}
