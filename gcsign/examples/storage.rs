use anyhow::Result;
use gcsign::storage::{DefaultCredentialProvider, RequestSigner};
use gcsign::{Context, DefaultContext, Signer};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Create a default context implementation
    let ctx_impl = DefaultContext::new();

    // Create a Context from the implementation
    let ctx = Context::new(ctx_impl.clone(), ctx_impl.clone()).with_env(ctx_impl.clone());

    // Create credential provider
    let provider = DefaultCredentialProvider::default();

    // Create request builder for the bucket
    let builder = RequestSigner::new("example-bucket");

    // Create the signer
    let signer = Signer::new(ctx.clone(), provider, builder);

    // Build a request
    let mut req = http::Request::builder()
        .method(http::Method::HEAD)
        .uri("https://storage.googleapis.com/example-bucket/hello.txt")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    // Sign the request
    signer.sign(&mut req, None).await?;

    // Execute the request
    let signed_req = http::Request::from_parts(req, bytes::Bytes::new());
    let resp = ctx.http_send(signed_req).await?;
    println!("Response status: {}", resp.status());

    Ok(())
}
