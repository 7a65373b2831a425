//! End to end tour of the Storage client.
//!
//! Expects default credentials to be available (for example through
//! `GOOGLE_APPLICATION_CREDENTIALS`) and a bucket you can write to:
//!
//! ```shell
//! GCSIGN_EXAMPLE_BUCKET=my-bucket cargo run --example storage_operations
//! ```

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use gcsign_core::Context;
use gcsign_file_read_tokio::TokioFileRead;
use gcsign_http_send_reqwest::ReqwestHttpSend;
use gcsign_storage::{DefaultCredentialProvider, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let bucket =
        std::env::var("GCSIGN_EXAMPLE_BUCKET").unwrap_or_else(|_| "example-bucket".to_string());

    let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default());
    let storage = Storage::new(ctx, DefaultCredentialProvider::default(), bucket);

    let key = "examples/storage_operations.rs";

    // Upload this very file as an attachment with some custom metadata.
    let metadata = HashMap::from([("origin".to_string(), "gcsign example".to_string())]);
    let uploaded = storage.upload(file!(), key, true, Some(&metadata)).await?;
    println!("uploaded: {uploaded}");

    println!("exists: {}", storage.exists(key).await?);

    // A signed URL works no matter what the object ACL says.
    let url = storage.private_url(key, Duration::from_secs(600)).await?;
    println!("signed url (10 minutes): {url}");

    // The public URL only becomes readable after make_public.
    storage.make_public(key).await?;
    println!("public url: {}", storage.public_url(key));
    storage.make_private(key).await?;

    storage.remove(key).await?;
    println!("removed: {}", !storage.exists(key).await?);

    Ok(())
}
