//! Abstract status vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport-independent outcome of a request.
///
/// Transport adapters translate these into wire status codes; [`Status::code`]
/// gives the HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The request succeeded.
    Ok,
    /// A new entity was created.
    Created,
    /// An existing entity was replaced or updated.
    Stored,
    /// An entity was removed.
    Removed,
    /// No entity lives at the requested path.
    NotFound,
    /// The entity refuses the operation for the caller.
    NotAllowed,
    /// The request itself is malformed.
    ClientError,
    /// The caller must authenticate first.
    Unauthenticated,
    /// An authorizer rejected the request.
    Unauthorized,
    /// A body was required but none was sent.
    FormatMissing,
    /// The body could not be parsed.
    FormatError,
    /// No codec is registered for the body's content type.
    FormatUnsupported,
    /// The body parsed but the domain refused it.
    FormatRejected,
    /// No codec can produce any of the accepted output types.
    NoAcceptableFormat,
    /// The method is not supported on this entity.
    UnsupportedMethod,
    /// An unexpected failure occurred.
    ServerError,
}

impl Status {
    /// HTTP status code for this status.
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::Stored => 204,
            Self::Removed => 204,
            Self::NotFound => 404,
            Self::NotAllowed => 403,
            Self::ClientError => 400,
            Self::Unauthenticated => 401,
            Self::Unauthorized => 403,
            Self::FormatMissing => 400,
            Self::FormatError => 400,
            Self::FormatUnsupported => 415,
            Self::FormatRejected => 422,
            Self::NoAcceptableFormat => 406,
            Self::UnsupportedMethod => 405,
            Self::ServerError => 500,
        }
    }

    /// Whether this status reports success.
    pub fn is_success(&self) -> bool {
        self.code() < 400
    }

    /// Ordering key used when several concurrent operations report different
    /// outcomes: server faults outrank client faults, which outrank success.
    pub fn severity(&self) -> u16 {
        self.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::Created => "CREATED",
            Self::Stored => "STORED",
            Self::Removed => "REMOVED",
            Self::NotFound => "NOT_FOUND",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::ClientError => "CLIENT_ERROR",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::FormatMissing => "FORMAT_MISSING",
            Self::FormatError => "FORMAT_ERROR",
            Self::FormatUnsupported => "FORMAT_UNSUPPORTED",
            Self::FormatRejected => "FORMAT_REJECTED",
            Self::NoAcceptableFormat => "NO_ACCEPTABLE_FORMAT",
            Self::UnsupportedMethod => "UNSUPPORTED_METHOD",
            Self::ServerError => "SERVER_ERROR",
        };
        f.write_str(name)
    }
}
