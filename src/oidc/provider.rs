//! OIDC provider
//!
//! Wires discovery into the endpoint-resolution hooks of a generic OAuth 2.0
//! client and exposes token introspection.

use super::discovery::Discovery;
use super::introspection::{self, ClientCredentials, IntrospectionMode};
use super::token::ParsedToken;
use crate::config::ProviderOptions;
use crate::error::Result;

/// Endpoint-resolution hooks consumed by an OAuth 2.0 authorization flow
pub trait EndpointResolver {
    /// Where the user agent is sent to authorize
    fn base_authorization_url(&self) -> &str;

    /// Where authorization grants are exchanged for tokens
    fn base_access_token_url(&self, params: &[(&str, &str)]) -> &str;

    /// Where resource owner details are fetched with an access token
    fn resource_owner_details_url(&self, access_token: &str) -> &str;
}

/// An OAuth 2.0 client configured from OIDC discovery
///
/// Construction runs discovery to completion; a provider value only exists
/// when both the well-known document and the key set were loaded.
#[derive(Debug)]
pub struct OidcProvider {
    options: ProviderOptions,
    http: reqwest::Client,
    discovery: Discovery,
}

impl OidcProvider {
    /// Create a provider, discovering its configuration with a default HTTP client
    pub async fn new(options: ProviderOptions) -> Result<Self> {
        Self::with_client(options, reqwest::Client::new()).await
    }

    /// Create a provider using the given HTTP client for every outbound request
    pub async fn with_client(options: ProviderOptions, http: reqwest::Client) -> Result<Self> {
        let well_known = options.well_known_endpoint()?.to_string();

        let discovery = Discovery::new(&http, &well_known, options.timeout).await?;

        Ok(Self {
            options,
            http,
            discovery,
        })
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Resolve a bearer token into claims
    ///
    /// `Local` verifies the signature with the cached JWKS using only algorithms
    /// both vetted here and advertised by the provider. `Remote` posts the token
    /// (plus `extra_params`, which win over the defaults) to the introspection
    /// endpoint. Any failure is a `TokenIntrospection` error.
    pub async fn introspect_token(
        &self,
        token: &str,
        extra_params: &[(&str, &str)],
        mode: IntrospectionMode,
    ) -> Result<ParsedToken> {
        match mode {
            IntrospectionMode::Local => {
                introspection::decode_locally(&self.discovery, token, self.options.leeway)
            }
            IntrospectionMode::Remote => {
                let credentials = ClientCredentials {
                    client_id: &self.options.client_id,
                    client_secret: self.options.client_secret.as_deref(),
                };
                introspection::introspect_remotely(
                    &self.http,
                    &self.discovery,
                    &credentials,
                    token,
                    extra_params,
                    self.options.timeout,
                )
                .await
            }
        }
    }
}

impl EndpointResolver for OidcProvider {
    fn base_authorization_url(&self) -> &str {
        self.discovery.authorization_endpoint()
    }

    fn base_access_token_url(&self, _params: &[(&str, &str)]) -> &str {
        self.discovery.token_endpoint()
    }

    fn resource_owner_details_url(&self, _access_token: &str) -> &str {
        self.discovery.userinfo_endpoint()
    }
}
