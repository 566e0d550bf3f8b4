/// Runtime settings, built once from the parsed command line.
use std::time::Duration;

use crate::api::{CredentialVars, Credentials, YelpClient, YelpError};
use crate::cli::Cli;

/// Everything needed to talk to the API, minus the secrets themselves.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Scheme and host of the API, e.g. `https://api.yelp.com`.
    pub api_base: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Where to read the credentials from.
    pub credential_vars: CredentialVars,
}

impl Settings {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_base: cli.api_base.clone(),
            timeout: Duration::from_secs(cli.timeout),
            credential_vars: CredentialVars::default(),
        }
    }

    /// Load credentials and build a client. No network traffic happens here.
    ///
    /// # Errors
    ///
    /// `MissingCredential` if any credential variable is unset, or
    /// `Transport` if the HTTP client cannot be created.
    pub fn connect(&self) -> Result<YelpClient, YelpError> {
        let credentials = Credentials::from_env(&self.credential_vars)?;
        tracing::debug!(api_base = %self.api_base, timeout = ?self.timeout, "client configured");
        YelpClient::new(&self.api_base, self.timeout, credentials)
    }
}
