//! Cache status command.

use std::path::Path;

use chrono::{DateTime, Utc};

use quickcal_auth::{AuthResult, Credential, TokenBroker};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Reports the credential cache state. Never prompts or touches the network.
pub fn run(config: &ClientConfig) -> ClientResult<()> {
    let http = super::http_client(config)?;
    let broker = TokenBroker::interactive(config.cache.locator()?, &http);
    let path = broker.cache_path()?;
    for line in describe(&path, broker.cached(), Utc::now())? {
        println!("{}", line);
    }
    Ok(())
}

/// Renders the status lines; cache misses are reported, other errors returned.
fn describe(
    path: &Path,
    loaded: AuthResult<Credential>,
    now: DateTime<Utc>,
) -> ClientResult<Vec<String>> {
    let mut lines = vec![format!("cache: {}", path.display())];

    let credential = match loaded {
        Ok(credential) => credential,
        Err(e) if e.is_cache_miss() => {
            lines.push(format!("state: not authorized ({})", e.kind()));
            lines.push("Run `quickcal auth` to authorize.".to_string());
            return Ok(lines);
        }
        Err(e) => return Err(e.into()),
    };

    lines.push("state: authorized".to_string());
    lines.push(format!("token type: {}", credential.token_type));
    lines.push(match credential.expiry {
        None => "expiry: none".to_string(),
        Some(expiry) if expiry <= now => format!("expiry: {} (expired)", expiry.to_rfc3339()),
        Some(expiry) => format!(
            "expiry: {} (in {} min)",
            expiry.to_rfc3339(),
            (expiry - now).num_minutes()
        ),
    });
    lines.push(format!(
        "refresh token: {}",
        if credential.has_refresh_token() {
            "present"
        } else {
            "missing"
        }
    ));
    Ok(lines)
}
