//! Interactive Authorization Code flow.
//!
//! The user opens a consent URL in a browser, approves access, and pastes
//! the code shown by the provider back into the terminal. The flow is
//! single-shot: a bad code or a rejected exchange ends it.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfiguration;
use crate::credential::Credential;
use crate::endpoint::TokenEndpoint;
use crate::error::{AuthError, AuthResult};

/// Anti-replay value embedded in the consent URL.
pub const STATE_TOKEN: &str = "state-token";

/// Where the consent URL is shown and the authorization code is typed.
pub trait Console {
    /// Shows the consent URL to the user.
    fn prompt(&mut self, auth_url: &str) -> io::Result<()>;

    /// Blocks until the user enters one line, the authorization code.
    fn read_code(&mut self) -> io::Result<String>;
}

/// [`Console`] on the process's stdout and stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&mut self, auth_url: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "Go to the following link in your browser then type the authorization code:"
        )?;
        writeln!(stdout, "{}", auth_url)?;
        stdout.flush()
    }

    fn read_code(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed before an authorization code was entered",
            ));
        }
        Ok(line)
    }
}

/// Builds the provider consent URL.
///
/// Requests offline access and forces the consent screen, so the provider
/// issues a refresh token on every run, not only the first.
pub fn consent_url(config: &ClientConfiguration) -> AuthResult<Url> {
    let mut url = Url::parse(&config.auth_url).map_err(|e| {
        AuthError::Configuration(format!("invalid auth_url '{}': {}", config.auth_url, e))
    })?;

    url.query_pairs_mut()
        .append_pair("access_type", "offline")
        .append_pair("client_id", &config.client_id)
        .append_pair("prompt", "consent")
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scopes.join(" "))
        .append_pair("state", STATE_TOKEN);

    Ok(url)
}

/// Drives the consent prompt and redeems the code.
pub struct InteractiveAuthorizer<C> {
    console: C,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl<C: Console> InteractiveAuthorizer<C> {
    /// Creates an authorizer that talks to the user through `console`.
    pub fn new(console: C, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self { console, endpoint }
    }

    /// The token endpoint used for exchanges.
    pub fn endpoint(&self) -> &Arc<dyn TokenEndpoint> {
        &self.endpoint
    }

    /// Runs the flow once and returns the freshly issued credential.
    ///
    /// Blocks on console input with no timeout.
    pub async fn obtain(&mut self, config: &ClientConfiguration) -> AuthResult<Credential> {
        let url = consent_url(config)?;
        debug!("consent URL built for {} scope(s)", config.scopes.len());

        self.console
            .prompt(url.as_str())
            .map_err(AuthError::Console)?;

        let code = self.console.read_code().map_err(AuthError::Console)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::Console(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty authorization code",
            )));
        }

        info!("received authorization code, exchanging for a credential");
        let credential = self.endpoint.exchange(config, code).await?;

        if !credential.has_refresh_token() {
            return Err(AuthError::Authorization(
                "provider did not issue a refresh token for an offline access request".to_string(),
            ));
        }

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::endpoint::BoxFuture;
    use crate::error::ErrorKind;

    struct ScriptedConsole {
        input: io::Result<String>,
        prompts: Vec<String>,
    }

    impl ScriptedConsole {
        fn typing(line: &str) -> Self {
            Self {
                input: Ok(line.to_string()),
                prompts: Vec::new(),
            }
        }
    }

    impl Console for ScriptedConsole {
        fn prompt(&mut self, auth_url: &str) -> io::Result<()> {
            self.prompts.push(auth_url.to_string());
            Ok(())
        }

        fn read_code(&mut self) -> io::Result<String> {
            match &self.input {
                Ok(line) => Ok(line.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    struct FixedEndpoint {
        result: fn() -> AuthResult<Credential>,
        codes: Mutex<Vec<String>>,
    }

    impl FixedEndpoint {
        fn returning(result: fn() -> AuthResult<Credential>) -> Arc<Self> {
            Arc::new(Self {
                result,
                codes: Mutex::new(Vec::new()),
            })
        }
    }

    impl TokenEndpoint for FixedEndpoint {
        fn exchange<'a>(
            &'a self,
            _config: &'a ClientConfiguration,
            code: &'a str,
        ) -> BoxFuture<'a, AuthResult<Credential>> {
            self.codes.lock().unwrap().push(code.to_string());
            Box::pin(async move { (self.result)() })
        }

        fn refresh<'a>(
            &'a self,
            _config: &'a ClientConfiguration,
            _refresh_token: &'a str,
        ) -> BoxFuture<'a, AuthResult<Credential>> {
            Box::pin(async { Err(AuthError::Authorization("not expected".to_string())) })
        }
    }

    fn config() -> ClientConfiguration {
        let scopes = vec!["read".to_string(), "write".to_string()];
        ClientConfiguration::new("client-123", "secret", scopes)
            .with_auth_url("https://provider.example/auth")
    }

    fn issued() -> AuthResult<Credential> {
        Ok(Credential::new("AT1", "Bearer").with_refresh_token("RT1"))
    }

    #[test]
    fn consent_url_carries_offline_access_and_state() {
        let url = consent_url(&config()).unwrap();
        assert_eq!(url.host_str(), Some("provider.example"));
        assert_eq!(url.path(), "/auth");

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["access_type"], "offline");
        assert_eq!(query["prompt"], "consent");
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["redirect_uri"], "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "read write");
        assert_eq!(query["state"], STATE_TOKEN);
    }

    #[test]
    fn consent_url_keeps_existing_query() {
        let config = config().with_auth_url("https://provider.example/auth?hd=example.com");
        let url = consent_url(&config).unwrap();
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["hd"], "example.com");
        assert_eq!(query["state"], STATE_TOKEN);
    }

    #[tokio::test]
    async fn obtain_prompts_once_and_exchanges_trimmed_code() {
        let endpoint = FixedEndpoint::returning(issued);
        let console = ScriptedConsole::typing("  AUTHCODE123\n");
        let mut authorizer = InteractiveAuthorizer::new(console, endpoint.clone());

        let credential = authorizer.obtain(&config()).await.unwrap();

        assert_eq!(credential.access_token, "AT1");
        assert_eq!(authorizer.console.prompts.len(), 1);
        assert!(authorizer.console.prompts[0].contains("access_type=offline"));
        assert_eq!(*endpoint.codes.lock().unwrap(), vec!["AUTHCODE123".to_string()]);
    }

    #[tokio::test]
    async fn console_failure_skips_exchange() {
        let endpoint = FixedEndpoint::returning(issued);
        let console = ScriptedConsole {
            input: Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed")),
            prompts: Vec::new(),
        };
        let mut authorizer = InteractiveAuthorizer::new(console, endpoint.clone());

        let err = authorizer.obtain(&config()).await.unwrap_err();
        assert!(matches!(err, AuthError::Console(_)));
        assert!(endpoint.codes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_code_is_rejected() {
        let endpoint = FixedEndpoint::returning(issued);
        let mut authorizer =
            InteractiveAuthorizer::new(ScriptedConsole::typing("   \n"), endpoint.clone());

        let err = authorizer.obtain(&config()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(endpoint.codes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_exchange_is_not_retried() {
        fn rejected() -> AuthResult<Credential> {
            Err(AuthError::Authorization("invalid_grant (400 Bad Request)".to_string()))
        }
        let endpoint = FixedEndpoint::returning(rejected);
        let mut authorizer =
            InteractiveAuthorizer::new(ScriptedConsole::typing("CODE\n"), endpoint.clone());

        let err = authorizer.obtain(&config()).await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
        assert_eq!(endpoint.codes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_refresh_token_is_rejected() {
        fn access_only() -> AuthResult<Credential> {
            Ok(Credential::new("AT1", "Bearer"))
        }
        let mut authorizer = InteractiveAuthorizer::new(
            ScriptedConsole::typing("CODE\n"),
            FixedEndpoint::returning(access_only),
        );

        let err = authorizer.obtain(&config()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("refresh token"));
    }
}
