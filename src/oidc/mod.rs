//! OpenID Connect discovery and token introspection

pub mod discovery;
pub mod introspection;
pub mod jwks;
pub mod provider;
pub mod token;

pub use discovery::{Discovery, DiscoveryDocument};
pub use introspection::{effective_algorithms, IntrospectionMode, ALLOWED_ALGORITHMS};
pub use jwks::KeyCache;
pub use provider::{EndpointResolver, OidcProvider};
pub use token::ParsedToken;
