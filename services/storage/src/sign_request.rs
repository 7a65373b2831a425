//! Google Cloud Storage legacy (V2) signing
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use http::header::AUTHORIZATION;
use http::header::CONTENT_TYPE;
use http::header::DATE;
use http::HeaderValue;
use log::debug;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use rand::thread_rng;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};

use gcsign_core::hash::base64_encode;
use gcsign_core::time::format_http_date;
use gcsign_core::time::now;
use gcsign_core::time::DateTime;
use gcsign_core::{Context, Error, Result};
use gcsign_core::{SignRequest, SigningMethod, SigningRequest};

use super::constants::*;
use super::credential::Credential;

/// RequestSigner that implements Google Cloud Storage legacy (V2)
/// authentication for the XML API.
///
/// Without an expiry the request is authenticated with an
/// `Authorization: GOOG1 ...` header; with an expiry a signed URL is
/// produced via the `GoogleAccessId`, `Expires` and `Signature` query
/// parameters.
///
/// - [Signed URLs V2 process](https://cloud.google.com/storage/docs/access-control/signed-urls-v2)
#[derive(Debug)]
pub struct RequestSigner {
    bucket: String,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a builder.
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let now = self.time.unwrap_or_else(now);

        let method = if let Some(expires_in) = expires_in {
            SigningMethod::Query(expires_in)
        } else {
            SigningMethod::Header
        };

        let mut ctx = SigningRequest::build(parts)?;
        canonicalize_path(&mut ctx)?;

        let string_to_sign = string_to_sign(&mut ctx, now, method, &self.bucket)?;
        let signature = sign(cred, &string_to_sign)?;

        match method {
            SigningMethod::Header => {
                // When x-goog-date is signed the Date header stays untouched,
                // the service reads the date from the extension header.
                if !ctx.headers.contains_key(GOOG_DATE) {
                    ctx.headers.insert(DATE, format_http_date(now).parse()?);
                }
                ctx.headers.insert(AUTHORIZATION, {
                    let mut value: HeaderValue =
                        format!("GOOG1 {}:{}", cred.client_email(), signature).parse()?;
                    value.set_sensitive(true);

                    value
                });
            }
            SigningMethod::Query(expire) => {
                ctx.query_push(
                    "GoogleAccessId",
                    utf8_percent_encode(cred.client_email(), &GOOG_QUERY_ENCODE_SET).to_string(),
                );
                ctx.query_push(
                    "Expires",
                    (now + chrono::TimeDelta::from_std(expire).unwrap())
                        .timestamp()
                        .to_string(),
                );
                ctx.query_push(
                    "Signature",
                    utf8_percent_encode(&signature, &GOOG_QUERY_ENCODE_SET).to_string(),
                );
            }
        }

        ctx.apply(parts)
    }
}

/// Decode then re-encode the path so that the bytes we sign are exactly the
/// bytes sent on the request line.
fn canonicalize_path(ctx: &mut SigningRequest) -> Result<()> {
    let path = percent_decode_str(&ctx.path)
        .decode_utf8()
        .map_err(|e| Error::unexpected("failed to decode path").with_source(e))?
        .into_owned();
    ctx.path = utf8_percent_encode(&path, &GOOG_URI_ENCODE_SET).to_string();

    Ok(())
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedExtensionHeaders +
/// CanonicalizedResource;
/// ```
///
/// With header authentication the Date line holds the HTTP date, or the empty
/// string when an `x-goog-date` extension header is signed instead. With query
/// authentication it holds the expiration as a Unix timestamp.
///
/// ## Reference
///
/// - [Signed URLs V2 signing process](https://cloud.google.com/storage/docs/access-control/signed-urls-v2)
fn string_to_sign(
    ctx: &mut SigningRequest,
    now: DateTime,
    method: SigningMethod,
    bucket: &str,
) -> Result<String> {
    let mut s = String::new();
    s.write_str(ctx.method.as_str())?;
    s.write_str("\n")?;
    s.write_str(ctx.header_get_or_default(&CONTENT_MD5.parse()?)?)?;
    s.write_str("\n")?;
    s.write_str(ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    s.write_str("\n")?;
    match method {
        SigningMethod::Header => {
            if ctx.headers.contains_key(GOOG_DATE) {
                writeln!(&mut s)?;
            } else {
                writeln!(&mut s, "{}", format_http_date(now))?;
            }
        }
        SigningMethod::Query(expires) => {
            writeln!(
                &mut s,
                "{}",
                (now + chrono::TimeDelta::from_std(expires).unwrap()).timestamp()
            )?;
        }
    }

    {
        let headers = canonicalize_header(ctx)?;
        if !headers.is_empty() {
            writeln!(&mut s, "{headers}",)?;
        }
    }
    write!(&mut s, "{}", canonicalize_resource(ctx, bucket))?;

    debug!("string to sign: {}", &s);
    Ok(s)
}

/// Sign the canonical string with the credential's RSA key, SHA-256 digest,
/// PKCS#1 v1.5 padding. The signature is returned base64 encoded.
fn sign(cred: &Credential, string_to_sign: &str) -> Result<String> {
    let signing_key = SigningKey::<sha2::Sha256>::new(cred.private_key().clone());
    let signature = signing_key
        .try_sign_with_rng(&mut thread_rng(), string_to_sign.as_bytes())
        .map_err(|e| Error::signing_failed("failed to sign request").with_source(e))?;

    Ok(base64_encode(&signature.to_bytes()))
}

/// Collect `x-goog-*` headers with normalized values, names lowercased and
/// sorted. Repeated headers collapse to the value seen last.
fn canonicalize_header(ctx: &mut SigningRequest) -> Result<String> {
    for (name, value) in ctx.headers.iter_mut() {
        if name.as_str().starts_with("x-goog-") {
            SigningRequest::header_value_normalize(value);
        }
    }

    let headers: BTreeMap<String, String> = ctx
        .header_to_vec_with_prefix("x-goog-")
        .into_iter()
        .collect();

    Ok(SigningRequest::header_to_string(
        headers.into_iter().collect(),
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Canonical extension headers and resources](https://cloud.google.com/storage/docs/access-control/signed-urls-v2#about-canonicalized-resources)
fn canonicalize_resource(ctx: &mut SigningRequest, bucket: &str) -> String {
    let params = ctx.query_to_vec_with_filter(is_sub_resource);

    let params_str = SigningRequest::query_to_string(params, "=", "&");

    // Virtual-hosted style requests carry the bucket in the authority, path
    // style requests already carry it in the path.
    let host = ctx.authority.host();
    let resource = if host == bucket || host.starts_with(&format!("{bucket}.")) {
        format!("/{bucket}{}", ctx.path)
    } else {
        ctx.path.clone()
    };

    if params_str.is_empty() {
        resource
    } else {
        format!("{resource}?{params_str}")
    }
}

fn is_sub_resource(param: &str) -> bool {
    SUBRESOURCES.contains(param)
}

// Subresource names are case sensitive.
static SUBRESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "billing",
        "compose",
        "cors",
        "defaultObjectAcl",
        "encryption",
        "lifecycle",
        "location",
        "logging",
        "storageClass",
        "tagging",
        "versioning",
        "versions",
        "websiteConfig",
    ])
});
