//! Token introspection
//!
//! Two ways to turn a bearer token into claims:
//! - `Local`: verify the JWT signature against the cached JWKS
//! - `Remote`: ask the provider's introspection endpoint
//!
//! Local results are cryptographically verified; remote results are whatever
//! the provider asserts. Both come back as a [`ParsedToken`].

use super::discovery::Discovery;
use super::token::ParsedToken;
use crate::error::{OidcError, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::time::Duration;

/// Algorithms accepted for local verification, regardless of what the provider advertises
pub const ALLOWED_ALGORITHMS: [Algorithm; 8] = [
    Algorithm::ES384,
    Algorithm::ES256,
    Algorithm::HS256,
    Algorithm::HS384,
    Algorithm::HS512,
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
];

/// How `introspect_token` resolves a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntrospectionMode {
    /// Verify the signature against the cached key set
    #[default]
    Local,
    /// POST the token to the provider's introspection endpoint
    Remote,
}

/// Intersect the provider's advertised algorithms with [`ALLOWED_ALGORITHMS`]
///
/// Keeps the provider's order and drops unknown names, `none` and duplicates.
pub fn effective_algorithms(advertised: &[String]) -> Vec<Algorithm> {
    let mut algorithms = Vec::new();
    for name in advertised {
        if let Ok(alg) = Algorithm::from_str(name) {
            if ALLOWED_ALGORITHMS.contains(&alg) && !algorithms.contains(&alg) {
                algorithms.push(alg);
            }
        }
    }
    algorithms
}

/// Verify a JWT against the discovered key set and return its claims
pub fn decode_locally(
    discovery: &Discovery,
    token: &str,
    leeway: u64,
) -> Result<ParsedToken> {
    let algorithms = effective_algorithms(discovery.userinfo_signing_alg_values_supported());
    if algorithms.is_empty() {
        return Err(OidcError::introspection(
            "Provider advertises no supported signing algorithm",
        ));
    }

    let header = decode_header(token).map_err(OidcError::introspection_caused_by)?;

    if !algorithms.contains(&header.alg) {
        return Err(OidcError::introspection(format!(
            "Algorithm {:?} is not allowed",
            header.alg
        )));
    }

    let kid = header
        .kid
        .as_deref()
        .ok_or_else(|| OidcError::introspection("Token header has no kid"))?;

    let jwk = discovery
        .key_cache()
        .find(kid)
        .ok_or_else(|| OidcError::introspection(format!("Key '{}' not found in JWKS", kid)))?;

    let key = DecodingKey::from_jwk(jwk).map_err(OidcError::introspection_caused_by)?;

    // The key only fits one algorithm family, so validate against the header's alg alone.
    let mut validation = Validation::new(header.alg);
    validation.leeway = leeway;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Map<String, Value>>(token, &key, &validation)
        .map_err(OidcError::introspection_caused_by)?;

    check_time_claims(&data.claims, chrono::Utc::now().timestamp(), leeway)?;

    tracing::debug!("Token verified locally with key {}", kid);
    Ok(ParsedToken::from(data.claims))
}

/// Reject tokens that are expired (`now - leeway >= exp`) or issued in the future
/// (`iat > now + leeway`). jsonwebtoken accepts `exp == now` and never looks at `iat`.
fn check_time_claims(claims: &Map<String, Value>, now: i64, leeway: u64) -> Result<()> {
    let now = now as f64;
    let leeway = leeway as f64;
    let claim = |name: &str| claims.get(name).and_then(Value::as_f64);

    if let Some(exp) = claim("exp") {
        if now - leeway >= exp {
            return Err(OidcError::introspection("Expired token"));
        }
    }

    if let Some(iat) = claim("iat") {
        if iat > now + leeway {
            return Err(OidcError::introspection(
                "Cannot handle token issued in the future",
            ));
        }
    }

    Ok(())
}

/// Client credentials sent alongside the token to the introspection endpoint
#[derive(Debug, Clone)]
pub struct ClientCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
}

/// Build the introspection form; caller parameters override defaults of the same name
pub fn introspection_params(
    credentials: &ClientCredentials<'_>,
    token: &str,
    extra_params: &[(&str, &str)],
) -> Vec<(String, String)> {
    let mut params = vec![("client_id".to_string(), credentials.client_id.to_string())];

    if let Some(secret) = credentials.client_secret {
        params.push(("client_secret".to_string(), secret.to_string()));
    }
    params.push(("token".to_string(), token.to_string()));

    for (name, value) in extra_params {
        match params.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => params.push((name.to_string(), value.to_string())),
        }
    }

    params
}

/// Ask the provider's introspection endpoint about a token
pub async fn introspect_remotely(
    http: &reqwest::Client,
    discovery: &Discovery,
    credentials: &ClientCredentials<'_>,
    token: &str,
    extra_params: &[(&str, &str)],
    timeout: Duration,
) -> Result<ParsedToken> {
    let endpoint = discovery
        .introspection_endpoint()
        .ok_or_else(|| OidcError::introspection("Invalid Token Introspection Endpoint"))?;

    let params = introspection_params(credentials, token, extra_params);

    tracing::debug!("Introspecting token at {}", endpoint);

    let response = http
        .post(endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&params)
        .timeout(timeout)
        .send()
        .await
        .map_err(OidcError::introspection_caused_by)?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::warn!("Token introspection failed with status: {}", status);
        return Err(OidcError::TokenIntrospection {
            message: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            status: Some(status.as_u16()),
            source: None,
        });
    }

    let body = response
        .text()
        .await
        .map_err(OidcError::introspection_caused_by)?;

    match ParsedToken::from_json(&body) {
        Ok(parsed) => Ok(parsed),
        Err(OidcError::Json(e)) => Err(OidcError::introspection_caused_by(e)),
        Err(e) => Err(e),
    }
}
