//! OIDC Discovery Library
//!
//! Discovers an OpenID Connect provider's endpoints and signing keys from its
//! well-known document, and verifies or introspects bearer tokens against it.

pub mod config;
pub mod error;
pub mod oidc;

pub use config::ProviderOptions;
pub use error::{OidcError, Result};
pub use oidc::{EndpointResolver, IntrospectionMode, OidcProvider, ParsedToken};
