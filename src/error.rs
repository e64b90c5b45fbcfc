//! Error types for the REST-GraphQL gateway.

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway
///
/// Covers the upstream boundary (transport failures, upstream error
/// envelopes), graph-shaping failures (type resolution, envelope shape
/// mismatches), and runtime errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure: no usable response was obtained
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered, with a non-success status or an error envelope
    #[error("upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A polymorphic node carried a missing or unrecognized discriminant
    #[error("cannot resolve concrete type: {0}")]
    TypeResolution(String),

    /// An upstream payload is missing its declared envelope key
    #[error("upstream response for {path} is missing the `{key}` envelope")]
    ShapeMismatch { path: String, key: String },

    /// Authentication/authorization errors
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// GraphQL schema errors
    #[error("GraphQL schema error: {0}")]
    Schema(String),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error("error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stable machine code attached to GraphQL errors under `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Transport(_) => "TRANSPORT_FAILURE",
            Error::Upstream { .. } => "UPSTREAM_ERROR",
            Error::TypeResolution(_) => "TYPE_RESOLUTION_FAILED",
            Error::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Error::Unauthorized(_) => "UNAUTHENTICATED",
            Error::Schema(_) => "SCHEMA_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Other(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert into a GraphQL field error carrying the machine code.
    pub fn to_field_error(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}
