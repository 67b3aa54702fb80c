//! OIDC provider discovery
//!
//! Fetches provider metadata from the well-known endpoint, then the signing
//! keys from the advertised `jwks_uri`. Construction is all-or-nothing: a
//! `Discovery` value only exists once both documents were fetched and parsed.

use super::jwks::KeyCache;
use crate::error::{OidcError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Provider metadata parsed from `/.well-known/openid-configuration`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub jwks_uri: String,
    pub introspection_endpoint: Option<String>,
    pub userinfo_signing_alg_values_supported: Vec<String>,
}

/// Wire shape; every field optional so missing ones can be reported together.
#[derive(Debug, Deserialize)]
struct RawDiscoveryDocument {
    issuer: Option<String>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    userinfo_endpoint: Option<String>,
    jwks_uri: Option<String>,
    introspection_endpoint: Option<String>,
    #[serde(default)]
    userinfo_signing_alg_values_supported: Vec<String>,
}

impl DiscoveryDocument {
    /// Parse and validate a well-known response body
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawDiscoveryDocument = serde_json::from_str(body)
            .map_err(|e| OidcError::well_known_caused_by("Failed to parse OIDC configuration", e))?;

        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<String>| -> String {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let document = DiscoveryDocument {
            issuer: require("issuer", raw.issuer),
            authorization_endpoint: require("authorization_endpoint", raw.authorization_endpoint),
            token_endpoint: require("token_endpoint", raw.token_endpoint),
            userinfo_endpoint: require("userinfo_endpoint", raw.userinfo_endpoint),
            jwks_uri: require("jwks_uri", raw.jwks_uri),
            introspection_endpoint: optional_endpoint("introspection_endpoint", raw.introspection_endpoint),
            userinfo_signing_alg_values_supported: raw.userinfo_signing_alg_values_supported,
        };

        if !missing.is_empty() {
            return Err(OidcError::well_known(format!(
                "OIDC configuration missing {}",
                missing.join(", ")
            )));
        }

        let endpoints = [
            ("authorization_endpoint", &document.authorization_endpoint),
            ("token_endpoint", &document.token_endpoint),
            ("userinfo_endpoint", &document.userinfo_endpoint),
            ("jwks_uri", &document.jwks_uri),
        ];

        for (name, value) in endpoints {
            if !is_absolute_url(value) {
                return Err(OidcError::well_known(format!(
                    "OIDC configuration has invalid {}: {}",
                    name, value
                )));
            }
        }

        Ok(document)
    }
}

/// Discovered provider metadata together with its signing keys
#[derive(Debug, Clone)]
pub struct Discovery {
    document: DiscoveryDocument,
    keys: KeyCache,
}

impl Discovery {
    /// Discover provider metadata and signing keys from a well-known URL
    pub async fn new(
        http: &reqwest::Client,
        well_known_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        validate_url(well_known_url)?;

        tracing::debug!("Fetching OIDC configuration from {}", well_known_url);
        let body = fetch_text(http, well_known_url, timeout)
            .await
            .map_err(|e| OidcError::well_known_caused_by("Failed to fetch OIDC configuration", e))?;
        let document = DiscoveryDocument::from_json(&body)?;

        let keys = KeyCache::fetch(http, &document.jwks_uri, timeout).await?;

        tracing::info!(
            "Discovered OIDC provider {} ({} signing keys)",
            document.issuer,
            keys.len()
        );

        Ok(Self::from_parts(document, keys))
    }

    /// Assemble from already-fetched parts
    pub fn from_parts(document: DiscoveryDocument, keys: KeyCache) -> Self {
        Self { document, keys }
    }

    pub fn document(&self) -> &DiscoveryDocument {
        &self.document
    }

    pub fn key_cache(&self) -> &KeyCache {
        &self.keys
    }

    pub fn issuer(&self) -> &str {
        &self.document.issuer
    }

    pub fn authorization_endpoint(&self) -> &str {
        &self.document.authorization_endpoint
    }

    pub fn token_endpoint(&self) -> &str {
        &self.document.token_endpoint
    }

    pub fn userinfo_endpoint(&self) -> &str {
        &self.document.userinfo_endpoint
    }

    pub fn introspection_endpoint(&self) -> Option<&str> {
        self.document.introspection_endpoint.as_deref()
    }

    pub fn userinfo_signing_alg_values_supported(&self) -> &[String] {
        &self.document.userinfo_signing_alg_values_supported
    }

    /// Raw JWKS payload as served by the provider
    pub fn public_key(&self) -> &serde_json::Value {
        self.keys.raw()
    }
}

/// Check that a URL has both a scheme and a host
pub fn validate_url(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| OidcError::InvalidUrl(format!("{}: {}", value, e)))?;

    if url.host_str().is_none() {
        return Err(OidcError::InvalidUrl(format!("{}: missing host", value)));
    }

    Ok(url)
}

/// Keep an optional endpoint only when it is a usable absolute URL
fn optional_endpoint(name: &str, value: Option<String>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty())?;

    if is_absolute_url(&value) {
        Some(value)
    } else {
        tracing::warn!("Ignoring invalid {} in OIDC configuration: {}", name, value);
        None
    }
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| url.host_str().is_some())
        .unwrap_or(false)
}

/// GET a URL and return its body, failing on transport errors and non-success statuses
pub(crate) async fn fetch_text(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> reqwest::Result<String> {
    http.get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "issuer": "https://idp.example.com",
        "authorization_endpoint": "https://idp.example.com/authorize",
        "token_endpoint": "https://idp.example.com/token",
        "userinfo_endpoint": "https://idp.example.com/userinfo",
        "jwks_uri": "https://idp.example.com/jwks",
        "introspection_endpoint": "https://idp.example.com/introspect",
        "userinfo_signing_alg_values_supported": ["RS256", "none"],
        "scopes_supported": ["openid"]
    }"#;

    #[test]
    fn test_parse_full_document() {
        let document = DiscoveryDocument::from_json(DOCUMENT).unwrap();

        assert_eq!(document.issuer, "https://idp.example.com");
        assert_eq!(document.authorization_endpoint, "https://idp.example.com/authorize");
        assert_eq!(document.token_endpoint, "https://idp.example.com/token");
        assert_eq!(document.userinfo_endpoint, "https://idp.example.com/userinfo");
        assert_eq!(document.jwks_uri, "https://idp.example.com/jwks");
        assert_eq!(
            document.introspection_endpoint.as_deref(),
            Some("https://idp.example.com/introspect")
        );
        assert_eq!(document.userinfo_signing_alg_values_supported, vec!["RS256", "none"]);
    }

    #[test]
    fn test_introspection_endpoint_optional() {
        let body = r#"{
            "issuer": "https://idp.example.com",
            "authorization_endpoint": "https://idp.example.com/authorize",
            "token_endpoint": "https://idp.example.com/token",
            "userinfo_endpoint": "https://idp.example.com/userinfo",
            "jwks_uri": "https://idp.example.com/jwks"
        }"#;
        let document = DiscoveryDocument::from_json(body).unwrap();

        assert!(document.introspection_endpoint.is_none());
        assert!(document.userinfo_signing_alg_values_supported.is_empty());
    }

    #[test]
    fn test_missing_fields_are_named() {
        let body = r#"{
            "issuer": "https://idp.example.com",
            "authorization_endpoint": "https://idp.example.com/authorize",
            "userinfo_endpoint": ""
        }"#;

        match DiscoveryDocument::from_json(body) {
            Err(OidcError::WellKnown { message, .. }) => {
                assert!(message.contains("token_endpoint"));
                assert!(message.contains("userinfo_endpoint"));
                assert!(message.contains("jwks_uri"));
                assert!(!message.contains("authorization_endpoint"));
            }
            other => panic!("expected WellKnown error, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let body = DOCUMENT.replace("https://idp.example.com/token", "/token");
        let err = DiscoveryDocument::from_json(&body).unwrap_err();
        assert!(matches!(err, OidcError::WellKnown { ref message, .. } if message.contains("token_endpoint")));
    }

    #[test]
    fn test_invalid_introspection_endpoint_dropped() {
        let body = DOCUMENT.replace("https://idp.example.com/introspect", "/introspect");
        let document = DiscoveryDocument::from_json(&body).unwrap();

        assert!(document.introspection_endpoint.is_none());
        assert_eq!(document.token_endpoint, "https://idp.example.com/token");
    }

    #[test]
    fn test_invalid_json_is_well_known_error() {
        let err = DiscoveryDocument::from_json("<html>").unwrap_err();
        assert!(matches!(err, OidcError::WellKnown { source: Some(_), .. }));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://idp.example.com/.well-known/openid-configuration").is_ok());
        assert!(matches!(validate_url("not a url"), Err(OidcError::InvalidUrl(_))));
        assert!(matches!(validate_url("mailto:admin@example.com"), Err(OidcError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let http = reqwest::Client::new();
        let err = Discovery::new(&http, "idp.example.com", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, OidcError::InvalidUrl(_)));
    }
}
