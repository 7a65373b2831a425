use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Env values used in Google Cloud Storage services.
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const GOOGLE_SERVICE_ACCOUNT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const GOOGLE_PRIVATE_KEY: &str = "GOOGLE_PRIVATE_KEY";
pub const GOOGLE_PRIVATE_KEY_PATH: &str = "GOOGLE_PRIVATE_KEY_PATH";

// Headers used in Google Cloud Storage services.
pub const CONTENT_MD5: &str = "content-md5";
pub const GOOG_ACL: &str = "x-goog-acl";
pub const GOOG_DATE: &str = "x-goog-date";
pub const GOOG_META_PREFIX: &str = "x-goog-meta-";

/// Default endpoint for the Google Cloud Storage XML API.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// AsciiSet for [Google UriEncode](https://cloud.google.com/storage/docs/authentication/canonical-requests)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static GOOG_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [Google UriEncode](https://cloud.google.com/storage/docs/authentication/canonical-requests)
///
/// But used in query.
pub static GOOG_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
