/// OAuth1 credentials loaded from the process environment.
use std::fmt;

use super::errors::YelpError;

/// Names of the four environment variables holding the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialVars {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            consumer_key: "YELP_CONSUMER_KEY".to_owned(),
            consumer_secret: "YELP_CONSUMER_SECRET".to_owned(),
            token: "YELP_TOKEN".to_owned(),
            token_secret: "YELP_TOKEN_SECRET".to_owned(),
        }
    }
}

/// Consumer and token credentials for one-legged OAuth1 signing.
///
/// Immutable once loaded; handed to the signer by value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl Credentials {
    /// Load all four credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `YelpError::MissingCredential` naming the first unset variable.
    pub fn from_env(vars: &CredentialVars) -> Result<Self, YelpError> {
        Self::from_lookup(vars, |name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary lookup, one call per variable.
    ///
    /// # Errors
    ///
    /// Returns `YelpError::MissingCredential` naming the first variable the
    /// lookup could not resolve.
    pub fn from_lookup<F>(vars: &CredentialVars, mut lookup: F) -> Result<Self, YelpError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut require = |name: &str| {
            lookup(name).ok_or_else(|| YelpError::MissingCredential {
                name: name.to_owned(),
            })
        };

        // Field initializers run top to bottom, which fixes the lookup order.
        let credentials = Self {
            consumer_key: require(&vars.consumer_key)?,
            consumer_secret: require(&vars.consumer_secret)?,
            token: require(&vars.token)?,
            token_secret: require(&vars.token_secret)?,
        };
        tracing::debug!("loaded credentials from environment");
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_loads_in_order() {
        let vars = CredentialVars::default();
        let e = env(&[
            ("YELP_CONSUMER_KEY", "ck"),
            ("YELP_CONSUMER_SECRET", "cs"),
            ("YELP_TOKEN", "tk"),
            ("YELP_TOKEN_SECRET", "ts"),
        ]);
        let mut seen = Vec::new();
        let creds = Credentials::from_lookup(&vars, |name| {
            seen.push(name.to_owned());
            e.get(name).cloned()
        })
        .unwrap();

        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.consumer_secret, "cs");
        assert_eq!(creds.token, "tk");
        assert_eq!(creds.token_secret, "ts");
        assert_eq!(
            seen,
            [
                "YELP_CONSUMER_KEY",
                "YELP_CONSUMER_SECRET",
                "YELP_TOKEN",
                "YELP_TOKEN_SECRET"
            ]
        );
    }

    #[test]
    fn test_missing_token_is_named() {
        let vars = CredentialVars::default();
        let e = env(&[
            ("YELP_CONSUMER_KEY", "ck"),
            ("YELP_CONSUMER_SECRET", "cs"),
            ("YELP_TOKEN_SECRET", "ts"),
        ]);
        let err = Credentials::from_lookup(&vars, |name| e.get(name).cloned()).unwrap_err();
        match err {
            YelpError::MissingCredential { name } => assert_eq!(name, "YELP_TOKEN"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_variable_names() {
        let vars = CredentialVars {
            consumer_key: "A".to_owned(),
            consumer_secret: "B".to_owned(),
            token: "C".to_owned(),
            token_secret: "D".to_owned(),
        };
        let e = env(&[("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")]);
        let creds = Credentials::from_lookup(&vars, |name| e.get(name).cloned()).unwrap();
        assert_eq!(creds.token, "3");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            consumer_key: "ck".to_owned(),
            consumer_secret: "very-secret".to_owned(),
            token: "tk".to_owned(),
            token_secret: "also-secret".to_owned(),
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("very-secret"));
        assert!(!dbg.contains("also-secret"));
        assert!(dbg.contains("ck"));
    }
}
