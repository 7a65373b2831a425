//! Bucket client for the Google Cloud Storage XML API.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderName, Request, StatusCode};
use log::{debug, warn};
use percent_encoding::utf8_percent_encode;

use gcsign_core::hash::base64_encode;
use gcsign_core::{Context, Error, ProvideCredential, Result, Signer};

use crate::acl::Acl;
use crate::constants::*;
use crate::credential::Credential;
use crate::sign_request::RequestSigner;

/// Storage is a bucket client for the Google Cloud Storage XML API, your main
/// entrypoint.
///
/// Every request is signed with the legacy `GOOG1` scheme before it reaches
/// the transport. The client keeps no object state, each call is a
/// single-shot request against the service.
///
/// # Example
///
/// ```no_run
/// use gcsign_core::Context;
/// use gcsign_file_read_tokio::TokioFileRead;
/// use gcsign_http_send_reqwest::ReqwestHttpSend;
/// use gcsign_storage::{DefaultCredentialProvider, Storage};
///
/// # async fn example() -> gcsign_core::Result<()> {
/// let ctx = Context::new(TokioFileRead, ReqwestHttpSend::default());
/// let storage = Storage::new(ctx, DefaultCredentialProvider::default(), "example-bucket");
///
/// if storage.exists("docs/report.pdf").await? {
///     storage.remove("docs/report.pdf").await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Storage {
    ctx: Context,
    signer: Signer<Credential>,
    bucket: String,
    endpoint: String,
}

impl Storage {
    /// Create a new bucket client.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
        bucket: impl Into<String>,
    ) -> Self {
        let bucket = bucket.into();
        let signer = Signer::new(ctx.clone(), provider, RequestSigner::new(&bucket));

        Self {
            ctx,
            signer,
            bucket,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Use an endpoint other than [`DEFAULT_ENDPOINT`], e.g. for a test
    /// emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// The URL of an object, percent encoded.
    ///
    /// This is also the public URL of the object: composing it performs no
    /// request and no signing, it is readable only once the object is
    /// publicly accessible.
    pub fn public_url(&self, key: &str) -> String {
        self.object_url(key)
    }

    /// Generate a signed URL granting access to an object for `expires_in`,
    /// regardless of its ACL.
    ///
    /// The URL carries the `GoogleAccessId`, `Expires` and `Signature` query
    /// parameters and requires no further authentication.
    pub async fn private_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let req = Request::get(self.object_url(key)).body(())?;

        let (mut parts, _) = req.into_parts();
        self.signer.sign(&mut parts, Some(expires_in)).await?;

        Ok(parts.uri.to_string())
    }

    /// Check whether an object exists.
    ///
    /// A 2xx answer reports the object as present and 404 reports it
    /// missing. A permission error also reports presence: being denied
    /// proves the object is there without granting read access. Any other
    /// status is an error, not an answer.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let req = Request::head(self.object_url(key)).body(Bytes::new())?;
        let resp = self.send(req).await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if status.is_success()
            || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            return Ok(true);
        }

        Err(Error::unexpected(format!(
            "exists probe failed with status {status}"
        )))
    }

    /// Upload a local file to `key`.
    ///
    /// With `as_attachment` the object is stored with a
    /// `Content-Disposition: attachment; filename=<basename>` header so
    /// browsers download it instead of rendering it inline. Entries of
    /// `metadata` are stored as `x-goog-meta-<key>` headers; keys must be
    /// valid header name tokens.
    ///
    /// Returns `false` when the service rejects the upload. Local failures
    /// (unreadable file, invalid metadata key) and transport failures are
    /// returned as errors.
    pub async fn upload(
        &self,
        path: &str,
        key: &str,
        as_attachment: bool,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<bool> {
        let content = self.ctx.file_read(path).await?;

        let mut req = Request::put(self.object_url(key))
            .header(CONTENT_MD5, base64_encode(md5::compute(&content).as_ref()));

        if as_attachment {
            let filename = Path::new(path)
                .file_name()
                .ok_or_else(|| Error::request_invalid("upload path has no file name"))?
                .to_string_lossy()
                .into_owned();
            req = req.header(CONTENT_DISPOSITION, format!("attachment; filename={filename}"));
        }

        if let Some(metadata) = metadata {
            for (k, v) in metadata {
                let name: HeaderName = format!("{GOOG_META_PREFIX}{k}").parse().map_err(|e| {
                    Error::request_invalid(format!("metadata key {k:?} is not a valid header token"))
                        .with_source(e)
                })?;
                req = req.header(name, v);
            }
        }

        let resp = self.send(req.body(Bytes::from(content))?).await?;
        if resp.status().is_success() {
            Ok(true)
        } else {
            warn!("upload of {key} failed with status {}", resp.status());
            Ok(false)
        }
    }

    /// Delete an object.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let req = Request::delete(self.object_url(key)).body(Bytes::new())?;
        let resp = self.send(req).await?;

        Self::ensure_success("remove", resp.status())
    }

    /// Grant `allUsers` read access to an object.
    pub async fn make_public(&self, key: &str) -> Result<()> {
        self.put_object_acl(key, Acl::PublicRead).await
    }

    /// Restrict an object to its owner.
    pub async fn make_private(&self, key: &str) -> Result<()> {
        self.put_object_acl(key, Acl::Private).await
    }

    /// Set the default ACL applied to objects created in the bucket without
    /// an explicit ACL.
    pub async fn set_default_acl(&self, acl: Acl) -> Result<()> {
        let url = format!("{}/{}?defaultObjectAcl", self.endpoint, self.bucket);
        let req = Request::put(url)
            .header(GOOG_ACL, acl.as_str())
            .body(Bytes::new())?;
        let resp = self.send(req).await?;

        Self::ensure_success("default acl update", resp.status())
    }

    /// Replace the bucket's CORS configuration with the given XML document.
    pub async fn set_cors(&self, document: impl Into<Bytes>) -> Result<()> {
        let url = format!("{}/{}?cors", self.endpoint, self.bucket);
        let req = Request::put(url)
            .header(CONTENT_TYPE, "application/xml")
            .body(document.into())?;
        let resp = self.send(req).await?;

        Self::ensure_success("cors update", resp.status())
    }

    async fn put_object_acl(&self, key: &str, acl: Acl) -> Result<()> {
        let url = format!("{}?acl", self.object_url(key));
        let req = Request::put(url)
            .header(GOOG_ACL, acl.as_str())
            .body(Bytes::new())?;
        let resp = self.send(req).await?;

        Self::ensure_success("acl update", resp.status())
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            utf8_percent_encode(key.trim_start_matches('/'), &GOOG_URI_ENCODE_SET)
        )
    }

    /// Sign the request and hand it to the transport.
    async fn send(&self, req: Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, None).await?;

        let req = Request::from_parts(parts, body);
        debug!("sending {} {}", req.method(), req.uri());
        self.ctx.http_send(req).await
    }

    fn ensure_success(op: &str, status: StatusCode) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Err(Error::permission_denied(format!(
                "{op} was rejected with status {status}"
            )))
        } else {
            Err(Error::unexpected(format!(
                "{op} failed with status {status}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use http::header::{AUTHORIZATION, DATE};
    use http::Method;

    use gcsign_core::{ErrorKind, HttpSend};
    use gcsign_file_read_tokio::TokioFileRead;

    use super::super::provide_credential::StaticCredentialProvider;
    use super::*;

    const TEST_EMAIL: &str = "sa@test-project.iam.gserviceaccount.com";
    const TEST_PRIVATE_KEY: &str = include_str!("../testdata/test_private_key.pem");

    /// Transport stub that answers with a fixed status and keeps the request
    /// for inspection.
    #[derive(Debug, Clone)]
    struct StaticHttpSend {
        status: StatusCode,
        captured: Arc<Mutex<Option<Request<Bytes>>>>,
    }

    impl StaticHttpSend {
        fn new(status: StatusCode) -> Self {
            Self {
                status,
                captured: Arc::new(Mutex::new(None)),
            }
        }

        fn captured(&self) -> Request<Bytes> {
            self.captured
                .lock()
                .unwrap()
                .take()
                .expect("a request must have been sent")
        }
    }

    #[async_trait]
    impl HttpSend for StaticHttpSend {
        async fn http_send(&self, req: Request<Bytes>) -> Result<http::Response<Bytes>> {
            *self.captured.lock().unwrap() = Some(req);

            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::new())
                .expect("response must build"))
        }
    }

    fn test_storage(status: StatusCode) -> (Storage, StaticHttpSend) {
        let http = StaticHttpSend::new(status);
        let ctx = Context::new(TokioFileRead, http.clone());
        let provider = StaticCredentialProvider::new(TEST_EMAIL, TEST_PRIVATE_KEY);

        (Storage::new(ctx, provider, "example-bucket"), http)
    }

    #[tokio::test]
    async fn test_exists_signs_and_probes() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::OK);

        assert!(storage.exists("docs/hello.txt").await?);

        let req = http.captured();
        assert_eq!(req.method(), Method::HEAD);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket/docs/hello.txt"
        );
        assert!(req.headers().contains_key(DATE));
        let auth = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with(&format!("GOOG1 {TEST_EMAIL}:")));

        Ok(())
    }

    #[tokio::test]
    async fn test_exists_missing_object() -> Result<()> {
        let (storage, _) = test_storage(StatusCode::NOT_FOUND);
        assert!(!storage.exists("docs/hello.txt").await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_exists_forbidden_object() -> Result<()> {
        let (storage, _) = test_storage(StatusCode::FORBIDDEN);

        // A permission error proves the object is there.
        assert!(storage.exists("docs/hello.txt").await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_exists_server_error_is_not_an_answer() {
        let (storage, _) = test_storage(StatusCode::INTERNAL_SERVER_ERROR);

        let err = storage.exists("docs/hello.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[tokio::test]
    async fn test_upload_as_attachment_with_metadata() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        tokio::fs::write(&path, b"Hello World").await.unwrap();

        let (storage, http) = test_storage(StatusCode::OK);
        let metadata = HashMap::from([("example".to_string(), "this is some text".to_string())]);

        let uploaded = storage
            .upload(path.to_str().unwrap(), "upload/test.txt", true, Some(&metadata))
            .await?;
        assert!(uploaded);

        let req = http.captured();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket/upload/test.txt"
        );
        assert_eq!(
            req.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=test.txt"
        );
        assert_eq!(
            req.headers().get("x-goog-meta-example").unwrap(),
            "this is some text"
        );
        assert!(req.headers().contains_key(CONTENT_MD5));
        assert_eq!(req.body().as_ref(), b"Hello World");

        Ok(())
    }

    #[tokio::test]
    async fn test_upload_inline_sets_no_disposition() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        tokio::fs::write(&path, b"Hello World").await.unwrap();

        let (storage, http) = test_storage(StatusCode::OK);
        let uploaded = storage
            .upload(path.to_str().unwrap(), "upload/test.txt", false, None)
            .await?;
        assert!(uploaded);

        let req = http.captured();
        assert!(req.headers().get(CONTENT_DISPOSITION).is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejected_by_service() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        tokio::fs::write(&path, b"Hello World").await.unwrap();

        let (storage, _) = test_storage(StatusCode::FORBIDDEN);
        let uploaded = storage
            .upload(path.to_str().unwrap(), "upload/test.txt", false, None)
            .await?;
        assert!(!uploaded);

        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejects_invalid_metadata_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        tokio::fs::write(&path, b"Hello World").await.unwrap();

        let (storage, _) = test_storage(StatusCode::OK);
        let metadata = HashMap::from([("not a token".to_string(), "value".to_string())]);

        let err = storage
            .upload(path.to_str().unwrap(), "upload/test.txt", false, Some(&metadata))
            .await
            .expect_err("metadata key with spaces must be rejected");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let (storage, _) = test_storage(StatusCode::OK);

        let result = storage
            .upload("/nonexistent/path/test.txt", "upload/test.txt", false, None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::NO_CONTENT);
        storage.remove("docs/hello.txt").await?;

        let req = http.captured();
        assert_eq!(req.method(), Method::DELETE);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket/docs/hello.txt"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_permission_denied() {
        let (storage, _) = test_storage(StatusCode::FORBIDDEN);

        let err = storage.remove("docs/hello.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_remove_unexpected_status() {
        let (storage, _) = test_storage(StatusCode::INTERNAL_SERVER_ERROR);

        let err = storage.remove("docs/hello.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[tokio::test]
    async fn test_make_public() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::OK);
        storage.make_public("docs/hello.txt").await?;

        let req = http.captured();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket/docs/hello.txt?acl"
        );
        assert_eq!(req.headers().get(GOOG_ACL).unwrap(), "public-read");

        Ok(())
    }

    #[tokio::test]
    async fn test_make_private() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::OK);
        storage.make_private("docs/hello.txt").await?;

        let req = http.captured();
        assert_eq!(req.headers().get(GOOG_ACL).unwrap(), "private");

        Ok(())
    }

    #[tokio::test]
    async fn test_set_default_acl() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::OK);
        storage.set_default_acl(Acl::PublicRead).await?;

        let req = http.captured();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket?defaultObjectAcl"
        );
        assert_eq!(req.headers().get(GOOG_ACL).unwrap(), "public-read");

        Ok(())
    }

    #[tokio::test]
    async fn test_set_cors() -> Result<()> {
        let (storage, http) = test_storage(StatusCode::OK);

        let doc = r#"<CorsConfig><Cors><Origins><Origin>*</Origin></Origins></Cors></CorsConfig>"#;
        storage.set_cors(doc).await?;

        let req = http.captured();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(
            req.uri().to_string(),
            "https://storage.googleapis.com/example-bucket?cors"
        );
        assert_eq!(req.headers().get(CONTENT_TYPE).unwrap(), "application/xml");
        assert_eq!(req.body().as_ref(), doc.as_bytes());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_cors_failure_is_an_error() {
        let (storage, _) = test_storage(StatusCode::BAD_REQUEST);

        let err = storage.set_cors("<CorsConfig/>").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_public_url_is_pure_composition() {
        let (storage, _) = test_storage(StatusCode::OK);

        assert_eq!(
            storage.public_url("docs/hello world.txt"),
            "https://storage.googleapis.com/example-bucket/docs/hello%20world.txt"
        );
    }

    #[tokio::test]
    async fn test_private_url_carries_signature_params() -> Result<()> {
        let (storage, _) = test_storage(StatusCode::OK);

        let url = storage
            .private_url("docs/hello.txt", Duration::from_secs(3600))
            .await?;
        assert!(url.starts_with(
            "https://storage.googleapis.com/example-bucket/docs/hello.txt?GoogleAccessId="
        ));
        assert!(url.contains("&Expires="));
        assert!(url.contains("&Signature="));

        Ok(())
    }

    #[test]
    fn test_with_endpoint_trims_trailing_slash() {
        let http = StaticHttpSend::new(StatusCode::OK);
        let ctx = Context::new(TokioFileRead, http);
        let provider = StaticCredentialProvider::new(TEST_EMAIL, TEST_PRIVATE_KEY);

        let storage = Storage::new(ctx, provider, "example-bucket")
            .with_endpoint("http://localhost:4443/");
        assert_eq!(
            storage.public_url("a.txt"),
            "http://localhost:4443/example-bucket/a.txt"
        );
    }
}
