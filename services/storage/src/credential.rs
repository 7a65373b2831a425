use std::fmt::{Debug, Formatter};

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::Deserialize;

use gcsign_core::utils::Redact;
use gcsign_core::{Error, Result, SigningCredential};

/// Credential for Google Cloud Storage.
///
/// Pairs the service account email with its RSA private key. The key is
/// parsed when the credential is constructed, so a malformed key is rejected
/// before any request is signed with it.
#[derive(Clone)]
pub struct Credential {
    client_email: String,
    private_key: RsaPrivateKey,
}

impl Credential {
    /// Create a new credential from a service account email and a PEM encoded
    /// RSA private key.
    ///
    /// Both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`)
    /// encodings are accepted.
    pub fn new(client_email: impl Into<String>, private_key_pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| {
                Error::credential_invalid("failed to parse rsa private key").with_source(e)
            })?;

        Ok(Self {
            client_email: client_email.into(),
            private_key,
        })
    }

    /// Create a new credential from a parsed service account key file.
    pub fn from_service_account(sa: &ServiceAccount) -> Result<Self> {
        Self::new(&sa.client_email, &sa.private_key)
    }

    /// The service account email this credential signs for.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_email", &self.client_email)
            .field("private_key", &"<rsa private key>")
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.client_email.is_empty()
    }
}

/// ServiceAccount holds the client email and private key for service account
/// authentication.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceAccount {
    /// Private key of credential
    pub private_key: String,
    /// The client email of credential
    pub client_email: String,
}

impl Debug for ServiceAccount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &Redact::from(&self.private_key))
            .finish()
    }
}

/// CredentialFile is the file which stores the credentials.
///
/// Only service account keys carry a private key that legacy request signing
/// can use, so other credential file types fail to parse.
#[derive(Clone, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialFile {
    /// Service account with private key.
    ServiceAccount(ServiceAccount),
}

impl CredentialFile {
    /// Parse credential file from bytes.
    pub fn from_slice(v: &[u8]) -> Result<Self> {
        serde_json::from_slice(v)
            .map_err(|e| Error::credential_invalid("failed to parse credential file").with_source(e))
    }
}
