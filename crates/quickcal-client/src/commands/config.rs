//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout, with the secret masked.
pub fn dump(config: &ClientConfig, source: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", source.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the OAuth client settings without contacting the provider.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let oauth = config.oauth.to_client_configuration()?;
    println!("OAuth client {} is valid.", oauth.client_id);
    println!("Scopes: {}", oauth.scopes.join(" "));
    Ok(())
}

/// Show the configuration file path.
pub fn path(source: &Path) -> ClientResult<()> {
    println!("config: {}", source.display());
    Ok(())
}
