//! Configuration parsing and validation

use crate::error::{OidcError, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LEEWAY_SECS: u64 = 0;

pub const OPTION_WELL_KNOWN_ENDPOINT: &str = "well_known_endpoint";

/// Options for constructing an [`OidcProvider`](crate::oidc::OidcProvider)
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// URL of the provider's `/.well-known/openid-configuration` document
    pub well_known_endpoint: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    /// Applied to every discovery and introspection request
    pub timeout: Duration,
    /// Allowed clock skew in seconds when checking `exp`/`nbf`/`iat` locally
    pub leeway: u64,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            well_known_endpoint: None,
            client_id: String::new(),
            client_secret: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            leeway: DEFAULT_LEEWAY_SECS,
        }
    }
}

impl ProviderOptions {
    pub fn new(well_known_endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            well_known_endpoint: Some(well_known_endpoint.into()),
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// Fail if a required option is absent
    pub fn validate(&self) -> Result<()> {
        self.well_known_endpoint().map(|_| ())
    }

    /// The well-known endpoint, or a configuration error when it is unset or blank
    pub fn well_known_endpoint(&self) -> Result<&str> {
        self.well_known_endpoint
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                OidcError::Config(format!(
                    "Required options not defined: {}",
                    OPTION_WELL_KNOWN_ENDPOINT
                ))
            })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "oidc-discovery",
    version,
    about = "OpenID Connect discovery and token introspection",
    long_about = "Discovers an OpenID Connect provider from its well-known endpoint and verifies or introspects bearer tokens against it"
)]
pub struct Config {
    /// URL of the provider's well-known configuration document
    #[arg(long, env = "OIDC_WELL_KNOWN_ENDPOINT")]
    pub well_known_endpoint: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "OIDC_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// OAuth client secret (optional for public clients)
    #[arg(long, env = "OIDC_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Request timeout in seconds for discovery and introspection
    #[arg(long, env = "OIDC_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Allowed clock skew in seconds for local token verification
    #[arg(long, env = "OIDC_LEEWAY_SECS", default_value_t = DEFAULT_LEEWAY_SECS)]
    pub leeway_secs: u64,

    /// Show only error messages
    #[arg(long, conflicts_with = "debug")]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long, env = "OIDC_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the discovered endpoints and signing algorithms
    Discover,

    /// Verify a token locally, or introspect it at the provider
    Introspect {
        /// The bearer token
        token: String,

        /// Use the provider's introspection endpoint instead of local verification
        #[arg(long)]
        remote: bool,

        /// Extra introspection parameter (key=value), may be repeated
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", value))
}

impl Config {
    /// Parse configuration from CLI arguments and environment variables
    pub fn parse_args() -> Self {
        Config::parse()
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            well_known_endpoint: self.well_known_endpoint.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            leeway: self.leeway_secs,
        }
    }

    /// Get log level based on flags
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
