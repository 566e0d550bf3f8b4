/// Blocking HTTP client for the Yelp v2 API.
///
/// Each call signs its own URL; nothing is retried.
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::credentials::Credentials;
use super::errors::YelpError;
use super::paginate::{Depaginator, PageSource};
use super::params::{BusinessQuery, SearchQuery};
use super::signer::Signer;
use crate::types::{Business, SearchPage};

/// Production API host.
pub const DEFAULT_API_BASE: &str = "https://api.yelp.com";

const SEARCH_PATH: &str = "/v2/search";
const BUSINESS_PATH: &str = "/v2/business";

/// Yelp API client. Holds one HTTP connection pool and the request signer.
pub struct YelpClient {
    http: Client,
    api_base: String,
    signer: Signer,
}

impl YelpClient {
    /// Create a client against `api_base` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `YelpError::Transport` if the HTTP client cannot be built.
    pub fn new(
        api_base: &str,
        timeout: Duration,
        credentials: Credentials,
    ) -> Result<Self, YelpError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_owned(),
            signer: Signer::new(credentials),
        })
    }

    /// Fetch one page of search results.
    ///
    /// # Errors
    ///
    /// `Signing`, `Transport`, `Api` (non-2xx) or `Decode` (unexpected body).
    pub fn search(&self, query: &SearchQuery) -> Result<SearchPage, YelpError> {
        self.get_json(SEARCH_PATH, &query.to_params())
    }

    /// Look up a single business by its Yelp id.
    ///
    /// # Errors
    ///
    /// Same as [`YelpClient::search`].
    pub fn business(&self, id: &str, query: &BusinessQuery) -> Result<Business, YelpError> {
        let path = format!("{BUSINESS_PATH}/{}", urlencoding::encode(id));
        self.get_json(&path, &query.to_params())
    }

    /// Iterate over every business matching `query`, one page per request.
    ///
    /// `max_pages` caps the number of requests; `None` runs until an empty page.
    #[must_use]
    pub fn depaginate(&self, query: &SearchQuery, max_pages: Option<u32>) -> Depaginator<'_, Self> {
        Depaginator::new(self, query, max_pages)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, YelpError> {
        let endpoint = format!("{}{path}", self.api_base);
        tracing::debug!(url = %endpoint, ?params, "GET");

        let signed = self.signer.sign("GET", &endpoint, params)?;
        let response = self.http.get(signed.as_str()).send().inspect_err(|e| {
            tracing::debug!(error = %e, timeout = e.is_timeout(), "request failed");
        })?;

        let status = response.status();
        let body = response.text()?;
        tracing::debug!(%status, bytes = body.len(), "response");

        if !status.is_success() {
            let body = serde_json::from_str(&body).unwrap_or_else(|_| Value::String(body));
            return Err(YelpError::Api { status, body });
        }

        serde_json::from_str(&body)
            .map_err(|e| YelpError::Decode(format!("{path}: {e}")))
    }
}

impl PageSource for YelpClient {
    fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, YelpError> {
        self.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::Location;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use serde_json::json;

    fn client(server: &mockito::ServerGuard) -> YelpClient {
        let creds = Credentials {
            consumer_key: "ck".to_owned(),
            consumer_secret: "cs".to_owned(),
            token: "tk".to_owned(),
            token_secret: "ts".to_owned(),
        };
        YelpClient::new(&server.url(), Duration::from_secs(5), creds).unwrap()
    }

    fn oauth_matchers() -> Vec<Matcher> {
        [
            "oauth_consumer_key=ck",
            "oauth_token=tk",
            "oauth_signature_method=HMAC-SHA1",
            "oauth_nonce=",
            "oauth_timestamp=",
            "oauth_signature=",
        ]
        .into_iter()
        .map(|s| Matcher::Regex(s.to_owned()))
        .collect()
    }

    #[test]
    fn test_search_sends_signed_query() {
        let mut server = mockito::Server::new();
        let mut matchers = oauth_matchers();
        matchers.push(Matcher::UrlEncoded("term".into(), "food".into()));
        matchers.push(Matcher::UrlEncoded("location".into(), "San Francisco".into()));
        let mock = server
            .mock("GET", "/v2/search")
            .match_query(Matcher::AllOf(matchers))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 1, "businesses": [{"id": "a", "name": "A"}]}"#)
            .expect(1)
            .create();

        let query = SearchQuery {
            term: Some("food".to_owned()),
            location: Some(Location::Address {
                location: "San Francisco".to_owned(),
                cll: None,
            }),
            ..SearchQuery::default()
        };
        let page = client(&server).search(&query).unwrap();

        mock.assert();
        assert_eq!(page.total, 1);
        assert_eq!(page.businesses, vec![json!({"id": "a", "name": "A"})]);
    }

    #[test]
    fn test_api_error_payload_passed_through() {
        let mut server = mockito::Server::new();
        let body = json!({"error": {"text": "AREA_TOO_LARGE"}});
        server
            .mock("GET", "/v2/search")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(body.to_string())
            .create();

        let err = client(&server).search(&SearchQuery::default()).unwrap_err();
        match err {
            YelpError::Api { status, body: got } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(got, body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_error_body_kept_as_string() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v2/search")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("Bad Gateway")
            .create();

        let err = client(&server).search(&SearchQuery::default()).unwrap_err();
        assert!(matches!(
            err,
            YelpError::Api { status, body: Value::String(ref s) }
                if status == StatusCode::BAD_GATEWAY && s == "Bad Gateway"
        ));
    }

    #[test]
    fn test_malformed_success_body() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v2/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>")
            .create();

        let err = client(&server).search(&SearchQuery::default()).unwrap_err();
        assert!(matches!(err, YelpError::Decode(_)));
    }

    #[test]
    fn test_business_lookup() {
        let mut server = mockito::Server::new();
        let mut matchers = oauth_matchers();
        matchers.push(Matcher::UrlEncoded("cc".into(), "US".into()));
        let mock = server
            .mock("GET", "/v2/business/gary-danko-san-francisco")
            .match_query(Matcher::AllOf(matchers))
            .with_status(200)
            .with_body(r#"{"id": "gary-danko-san-francisco", "rating": 4.5}"#)
            .create();

        let query = BusinessQuery {
            cc: Some("US".to_owned()),
            ..BusinessQuery::default()
        };
        let business = client(&server)
            .business("gary-danko-san-francisco", &query)
            .unwrap();

        mock.assert();
        assert_eq!(business["rating"], json!(4.5));
    }

    #[test]
    fn test_depaginate_over_http() {
        let mut server = mockito::Server::new();
        let pages = [
            ("0", r#"{"total": 3, "businesses": [{"id": "a"}, {"id": "b"}]}"#),
            ("2", r#"{"total": 3, "businesses": [{"id": "c"}]}"#),
            ("4", r#"{"total": 3, "businesses": []}"#),
        ];
        let mocks: Vec<_> = pages
            .iter()
            .map(|(offset, body)| {
                server
                    .mock("GET", "/v2/search")
                    .match_query(Matcher::AllOf(vec![
                        Matcher::UrlEncoded("limit".into(), "2".into()),
                        Matcher::UrlEncoded("offset".into(), (*offset).into()),
                    ]))
                    .with_status(200)
                    .with_body(*body)
                    .expect(1)
                    .create()
            })
            .collect();

        let query = SearchQuery {
            limit: Some(2),
            ..SearchQuery::default()
        };
        let c = client(&server);
        let ids: Vec<String> = c
            .depaginate(&query, None)
            .map(|b| b.unwrap()["id"].as_str().unwrap().to_owned())
            .collect();

        assert_eq!(ids, ["a", "b", "c"]);
        for m in &mocks {
            m.assert();
        }
    }

    #[test]
    fn test_timeout_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        std::thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(10));
        });

        let creds = Credentials {
            consumer_key: "ck".to_owned(),
            consumer_secret: "cs".to_owned(),
            token: "tk".to_owned(),
            token_secret: "ts".to_owned(),
        };
        let c = YelpClient::new(&format!("http://{addr}"), Duration::from_secs(1), creds).unwrap();
        let err = c.search(&SearchQuery::default()).unwrap_err();

        assert!(matches!(&err, YelpError::Transport(e) if e.is_timeout()));
        assert!(err.to_string().starts_with("Request timed out"));
        assert_eq!(err.exit_code(), 1);
    }
}
