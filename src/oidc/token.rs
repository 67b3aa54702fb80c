//! Parsed token claims
//!
//! Wraps claims produced either by local JWT verification or by a remote
//! introspection response. Both paths yield the same JSON object shape; the
//! caller knows which path produced it.

use crate::error::{OidcError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a verified or introspected token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedToken {
    claims: Map<String, Value>,
}

impl From<Map<String, Value>> for ParsedToken {
    fn from(claims: Map<String, Value>) -> Self {
        ParsedToken { claims }
    }
}

impl ParsedToken {
    /// Parse a JSON body that must be an object
    pub fn from_json(body: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(claims) => Ok(ParsedToken { claims }),
            other => Err(OidcError::introspection(format!(
                "Expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Look up a single claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Audience as a list (the claim may be a single string or an array)
    pub fn audience(&self) -> Vec<String> {
        match self.get("aud") {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Expiry from the `exp` claim (seconds since the Unix epoch)
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// The `active` flag of an introspection response
    pub fn is_active(&self) -> Option<bool> {
        self.get("active").and_then(Value::as_bool)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let token = ParsedToken::from_json(r#"{"active": true, "sub": "u1"}"#).unwrap();

        assert_eq!(token.is_active(), Some(true));
        assert_eq!(token.subject(), Some("u1"));
        assert_eq!(token.claims().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let err = ParsedToken::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, OidcError::TokenIntrospection { .. }));

        let err = ParsedToken::from_json("not json").unwrap_err();
        assert!(matches!(err, OidcError::Json(_)));
    }

    #[test]
    fn test_standard_claims() {
        let claims = json!({
            "iss": "https://idp.example.com",
            "sub": "alice",
            "aud": ["api", "web"],
            "exp": 1_700_000_000,
            "tenant": {"id": 7}
        });
        let token = ParsedToken::from(claims.as_object().unwrap().clone());

        assert_eq!(token.issuer(), Some("https://idp.example.com"));
        assert_eq!(token.audience(), vec!["api".to_string(), "web".to_string()]);
        assert_eq!(token.expires_at().map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(token.get("tenant"), Some(&json!({"id": 7})));
        assert_eq!(token.is_active(), None);
    }

    #[test]
    fn test_single_string_audience() {
        let token = ParsedToken::from_json(r#"{"aud": "api"}"#).unwrap();
        assert_eq!(token.audience(), vec!["api".to_string()]);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let token = ParsedToken::from_json(r#"{"active": false}"#).unwrap();
        assert_eq!(serde_json::to_value(&token).unwrap(), json!({"active": false}));
    }
}
