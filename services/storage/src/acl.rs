use std::fmt;

/// Predefined (canned) ACLs supported by the Google Cloud Storage XML API.
///
/// Applied to objects via the `x-goog-acl` header and to buckets via the
/// `?defaultObjectAcl` sub-resource.
///
/// - [Predefined ACLs](https://cloud.google.com/storage/docs/access-control/lists#predefined-acl)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    /// Object owner gets `OWNER` access.
    Private,
    /// Object owner gets `OWNER` access, and `allUsers` get `READER` access.
    PublicRead,
    /// Object owner gets `OWNER` access, and `allUsers` get `READER` and
    /// `WRITER` access.
    PublicReadWrite,
    /// Object owner gets `OWNER` access, and `allAuthenticatedUsers` get
    /// `READER` access.
    AuthenticatedRead,
    /// Object owner gets `OWNER` access, and project team owners get
    /// `READER` access.
    BucketOwnerRead,
    /// Object owner gets `OWNER` access, and project team owners get
    /// `OWNER` access.
    BucketOwnerFullControl,
    /// Object owner gets `OWNER` access, and project team members get
    /// access according to their roles.
    ProjectPrivate,
}

impl Acl {
    /// Get the `x-goog-acl` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
            Self::ProjectPrivate => "project-private",
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
