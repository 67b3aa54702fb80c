//! Error types for OIDC discovery and token introspection

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum OidcError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Well-known endpoint error: {message}")]
    WellKnown {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Certificate endpoint error: {message}")]
    Certificate {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Token introspection failed: {message}")]
    TokenIntrospection {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OidcError {
    pub fn well_known(message: impl Into<String>) -> Self {
        OidcError::WellKnown {
            message: message.into(),
            source: None,
        }
    }

    /// Well-known failure; the message is `context` followed by the cause
    pub fn well_known_caused_by<E>(context: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OidcError::WellKnown {
            message: format!("{}: {}", context, source),
            source: Some(Box::new(source)),
        }
    }

    pub fn certificate(message: impl Into<String>) -> Self {
        OidcError::Certificate {
            message: message.into(),
            source: None,
        }
    }

    /// Certificate failure; the message is `context` followed by the cause
    pub fn certificate_caused_by<E>(context: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OidcError::Certificate {
            message: format!("{}: {}", context, source),
            source: Some(Box::new(source)),
        }
    }

    /// Introspection failure without an HTTP status or underlying cause
    pub fn introspection(message: impl Into<String>) -> Self {
        OidcError::TokenIntrospection {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Introspection failure wrapping the error that caused it
    pub fn introspection_caused_by<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OidcError::TokenIntrospection {
            message: source.to_string(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status carried by a remote introspection failure
    pub fn status(&self) -> Option<u16> {
        match self {
            OidcError::TokenIntrospection { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OidcError>;
