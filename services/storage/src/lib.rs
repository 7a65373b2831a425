//! Google Cloud Storage Signer

mod constants;
pub use constants::DEFAULT_ENDPOINT;

mod acl;
pub use acl::Acl;

mod credential;
pub use credential::{Credential, CredentialFile, ServiceAccount};

mod config;
pub use config::Config;

mod provide_credential;
pub use provide_credential::{
    ConfigCredentialProvider, DefaultCredentialProvider, EnvCredentialProvider,
    StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod client;
pub use client::Storage;
