//! OIDC Discovery - command line entry point
//!
//! Discovers an OpenID Connect provider and verifies or introspects tokens
//! against it. Results go to stdout as JSON; logs go to stderr.

use oidc_discovery_rs::config::{Command, Config};
use oidc_discovery_rs::error::Result;
use oidc_discovery_rs::oidc::{effective_algorithms, IntrospectionMode, OidcProvider};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.log_level())));

    // Keep stdout for results only
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();

    setup_logging(&config);

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    let options = config.provider_options();

    info!("Discovering OIDC provider...");
    let provider = OidcProvider::new(options).await?;

    let output = match config.command {
        Command::Discover => {
            let discovery = provider.discovery();
            let algorithms: Vec<String> =
                effective_algorithms(discovery.userinfo_signing_alg_values_supported())
                    .iter()
                    .map(|alg| format!("{:?}", alg))
                    .collect();

            json!({
                "document": discovery.document(),
                "effective_algorithms": algorithms,
                "keys": discovery.key_cache().len(),
            })
        }
        Command::Introspect {
            token,
            remote,
            params,
        } => {
            let mode = if remote {
                IntrospectionMode::Remote
            } else {
                IntrospectionMode::Local
            };
            let extra: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();

            let parsed = provider.introspect_token(&token, &extra, mode).await?;
            serde_json::to_value(parsed)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
