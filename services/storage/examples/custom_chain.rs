//! Example of building a custom credential chain with specific providers

use gcsign_core::{Context, ProvideCredential, ProvideCredentialChain};
use gcsign_file_read_tokio::TokioFileRead;
use gcsign_http_send_reqwest::ReqwestHttpSend;
use gcsign_storage::{
    DefaultCredentialProvider, EnvCredentialProvider, StaticCredentialProvider,
};

#[tokio::main]
async fn main() -> gcsign_core::Result<()> {
    env_logger::init();

    // Create context
    let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default());

    // Build a custom chain with specific priority order
    let mut chain = ProvideCredentialChain::new()
        // First, try GOOGLE_SERVICE_ACCOUNT_EMAIL / GOOGLE_PRIVATE_KEY
        .push(EnvCredentialProvider)
        // Then fall back to the full default resolution
        .push(DefaultCredentialProvider::default());

    // Chains can also grow dynamically, e.g. a key pasted into the
    // environment by a CI job. Providers that fail to parse are logged
    // and skipped, they never mask a later working provider.
    if let (Ok(email), Ok(key)) = (
        std::env::var("CI_SERVICE_ACCOUNT_EMAIL"),
        std::env::var("CI_PRIVATE_KEY"),
    ) {
        chain = chain.push_front(StaticCredentialProvider::new(&email, &key));
    }

    match chain.provide_credential(&ctx).await? {
        Some(cred) => println!("Found credential for {}", cred.client_email()),
        None => println!("No credentials found"),
    }

    Ok(())
}
