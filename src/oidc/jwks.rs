//! JWKS key cache
//!
//! Holds the provider's signing keys, fetched once from the `jwks_uri`.
//! Keys are never refreshed; rotating them requires a fresh discovery.

use super::discovery::fetch_text;
use crate::error::{OidcError, Result};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde_json::Value;
use std::time::Duration;

/// Signing keys published by the provider
#[derive(Debug, Clone)]
pub struct KeyCache {
    raw: Value,
    keys: JwkSet,
}

impl KeyCache {
    /// Fetch the key set from a JWKS endpoint
    pub async fn fetch(http: &reqwest::Client, jwks_uri: &str, timeout: Duration) -> Result<Self> {
        tracing::debug!("Fetching JWKS from {}", jwks_uri);

        let body = fetch_text(http, jwks_uri, timeout)
            .await
            .map_err(|e| OidcError::certificate_caused_by("Failed to fetch JWKS", e))?;

        Self::from_json(&body)
    }

    /// Parse a JWKS document, skipping entries that are not usable keys
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(body)
            .map_err(|e| OidcError::certificate_caused_by("Failed to parse JWKS", e))?;

        let entries = raw
            .get("keys")
            .and_then(Value::as_array)
            .ok_or_else(|| OidcError::certificate("JWKS has no keys array"))?;

        let keys: Vec<Jwk> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<Jwk>(entry.clone()) {
                Ok(jwk) => Some(jwk),
                Err(e) => {
                    tracing::warn!(
                        "Skipping unusable JWKS entry (kid: {}): {}",
                        entry.get("kid").and_then(serde_json::Value::as_str).unwrap_or("none"),
                        e
                    );
                    None
                }
            })
            .collect();

        if keys.is_empty() {
            return Err(OidcError::certificate("JWKS contains no usable keys"));
        }

        Ok(Self {
            raw,
            keys: JwkSet { keys },
        })
    }

    /// Look up a key by its key ID
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.find(kid)
    }

    pub fn keys(&self) -> &JwkSet {
        &self.keys
    }

    /// The JWKS document exactly as served
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.keys.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWKS: &str = r#"{
        "keys": [
            {"kty": "oct", "kid": "hmac-1", "alg": "HS256", "use": "sig", "k": "c2VjcmV0LWtleS1mb3ItdGVzdHM"},
            {"kty": "XYZ", "kid": "bogus"}
        ]
    }"#;

    #[test]
    fn test_parse_skips_unusable_keys() {
        let cache = KeyCache::from_json(JWKS).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.find("hmac-1").is_some());
        assert!(cache.find("bogus").is_none());
        assert!(cache.find("missing").is_none());
    }

    #[test]
    fn test_raw_payload_kept_verbatim() {
        let cache = KeyCache::from_json(JWKS).unwrap();
        let raw_keys = cache.raw()["keys"].as_array().unwrap();

        assert_eq!(raw_keys.len(), 2);
        assert_eq!(raw_keys[1]["kid"], "bogus");
    }

    #[test]
    fn test_empty_key_set_rejected() {
        let err = KeyCache::from_json(r#"{"keys": []}"#).unwrap_err();
        assert!(matches!(err, OidcError::Certificate { .. }));
    }

    #[test]
    fn test_malformed_jwks_rejected() {
        assert!(matches!(KeyCache::from_json("{"), Err(OidcError::Certificate { .. })));
        assert!(matches!(
            KeyCache::from_json(r#"{"items": []}"#),
            Err(OidcError::Certificate { .. })
        ));
    }
}
