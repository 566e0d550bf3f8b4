/// One-legged OAuth 1.0a request signing (HMAC-SHA1).
///
/// Every call to [`Signer::sign`] draws a fresh nonce and timestamp, so a
/// signed URL is good for exactly one request. The signature covers the
/// method, the normalized endpoint URL and every query parameter, including
/// any query already present on the endpoint.
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha1::Sha1;

use super::credentials::Credentials;
use super::errors::YelpError;

type HmacSha1 = Hmac<Sha1>;

/// Ordered query parameters. Order is preserved into the signed URL.
pub type QueryParams = Vec<(String, String)>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const NONCE_LEN: usize = 32;

/// A fully signed, single-use request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    url: String,
}

impl SignedRequest {
    /// The absolute URL, ready for an HTTP GET.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Signs requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign a request with a fresh nonce and the current time.
    ///
    /// # Errors
    ///
    /// Returns `YelpError::Signing` if a credential is empty or `base_url` is
    /// not an absolute http(s) URL.
    pub fn sign(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
    ) -> Result<SignedRequest, YelpError> {
        self.sign_with(method, base_url, params, &generate_nonce(), unix_timestamp())
    }

    /// Sign with an explicit nonce and timestamp.
    fn sign_with(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<SignedRequest, YelpError> {
        self.check_credentials()?;

        let url = Url::parse(base_url)
            .map_err(|e| YelpError::Signing(format!("invalid endpoint URL '{base_url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(YelpError::Signing(format!(
                "endpoint URL '{base_url}' is not an absolute http(s) URL"
            )));
        }
        let endpoint = normalized_url(&url);

        let mut query: QueryParams = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        query.extend_from_slice(params);

        let timestamp = timestamp.to_string();
        let oauth: QueryParams = [
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.token.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let mut signed_params = query;
        signed_params.extend(oauth);

        let signature = sign_hmac_sha1(
            method,
            &endpoint,
            &signed_params,
            &self.credentials.consumer_secret,
            &self.credentials.token_secret,
        )?;
        signed_params.push(("oauth_signature".to_owned(), signature));

        Ok(SignedRequest {
            url: format!("{endpoint}?{}", encode_pairs(&signed_params)),
        })
    }

    fn check_credentials(&self) -> Result<(), YelpError> {
        let c = &self.credentials;
        for (field, value) in [
            ("consumer key", &c.consumer_key),
            ("consumer secret", &c.consumer_secret),
            ("token", &c.token),
            ("token secret", &c.token_secret),
        ] {
            if value.is_empty() {
                return Err(YelpError::Signing(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.
fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn encode_pairs(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Scheme and host lowercased, default port dropped, no query or fragment.
fn normalized_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{host}{port}{}", url.scheme(), url.path())
}

/// The OAuth1 signature base string: `METHOD&url&params`, each part encoded.
fn signature_base_string(method: &str, endpoint: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(endpoint),
        percent_encode(&normalized)
    )
}

fn sign_hmac_sha1(
    method: &str,
    endpoint: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, YelpError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let base = signature_base_string(method, endpoint, params);

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| YelpError::Signing(format!("bad signing key: {e}")))?;
    mac.update(base.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

fn generate_nonce() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(NONCE_LEN)
        .collect()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
