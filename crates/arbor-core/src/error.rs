//! Error types for Arbor operations.

use crate::{AuthScheme, Method, Representation, Status};
use thiserror::Error;

/// Errors raised while resolving, authorizing, or dispatching a request.
///
/// Every variant maps to exactly one [`Status`]. Any variant can carry a
/// structured error body through [`Error::with_representation`].
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing lives at the requested path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity refuses the operation for the current caller.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// The method makes no sense for the targeted entity.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(Method),

    /// The request is malformed.
    #[error("bad request: {0}")]
    ClientError(String),

    /// The caller must authenticate with one of the listed schemes.
    #[error("authentication required")]
    Unauthenticated {
        /// Schemes offered to the caller.
        schemes: Vec<AuthScheme>,
    },

    /// An authorizer rejected the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A request body was required but absent.
    #[error("request body missing")]
    FormatMissing,

    /// The request body could not be parsed.
    #[error("malformed body: {0}")]
    FormatError(String),

    /// No codec handles the request body's content type.
    #[error("unsupported content type: {0}")]
    FormatUnsupported(String),

    /// The body parsed but the domain refused its content.
    #[error("body rejected: {0}")]
    FormatRejected(String),

    /// No codec can produce any of the accepted types.
    #[error("no acceptable output format")]
    NoAcceptableFormat,

    /// A session could not be loaded or stored.
    #[error("session error: {0}")]
    Session(String),

    /// An unexpected collaborator failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// An error paired with a structured body.
    #[error("{error}")]
    Detailed {
        /// The underlying error.
        error: Box<Error>,
        /// Body describing the error.
        representation: Box<Representation>,
    },
}

/// A specialized Result type for Arbor operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a not allowed error.
    #[must_use]
    pub fn not_allowed(what: impl Into<String>) -> Self {
        Self::NotAllowed(what.into())
    }

    /// Creates an authentication challenge.
    #[must_use]
    pub fn unauthenticated(schemes: Vec<AuthScheme>) -> Self {
        Self::Unauthenticated { schemes }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    /// Attaches a structured body, replacing any body already attached.
    #[must_use]
    pub fn with_representation(self, representation: Representation) -> Self {
        let error = match self {
            Self::Detailed { error, .. } => error,
            other => Box::new(other),
        };
        Self::Detailed {
            error,
            representation: Box::new(representation),
        }
    }

    /// The error without any attached body.
    pub fn kind(&self) -> &Error {
        match self {
            Self::Detailed { error, .. } => error.kind(),
            other => other,
        }
    }

    /// The attached error body, if any.
    pub fn representation(&self) -> Option<&Representation> {
        match self {
            Self::Detailed { representation, .. } => Some(representation),
            _ => None,
        }
    }

    /// Splits off the attached body.
    pub fn into_parts(self) -> (Error, Option<Representation>) {
        match self {
            Self::Detailed {
                error,
                representation,
            } => (*error, Some(*representation)),
            other => (other, None),
        }
    }

    /// Schemes carried by an authentication challenge.
    pub fn schemes(&self) -> &[AuthScheme] {
        match self.kind() {
            Self::Unauthenticated { schemes } => schemes,
            _ => &[],
        }
    }

    /// The status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::NotAllowed(_) => Status::NotAllowed,
            Self::UnsupportedMethod(_) => Status::UnsupportedMethod,
            Self::ClientError(_) => Status::ClientError,
            Self::Unauthenticated { .. } => Status::Unauthenticated,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::FormatMissing => Status::FormatMissing,
            Self::FormatError(_) => Status::FormatError,
            Self::FormatUnsupported(_) => Status::FormatUnsupported,
            Self::FormatRejected(_) => Status::FormatRejected,
            Self::NoAcceptableFormat => Status::NoAcceptableFormat,
            Self::Session(_) | Self::Internal(_) => Status::ServerError,
            Self::Detailed { error, .. } => error.status(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::FormatError(e.to_string())
    }
}
