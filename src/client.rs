//! CircleCI API client.
//!
//! Low-level HTTP client that handles request construction, authentication
//! and response classification. Higher-level operations live on the model
//! types and in the convenience functions of [`crate::models`].

use std::env;
use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{ApiError, CircleError, Result};

/// Base URL of the hosted CircleCI v1.1 API.
pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v1.1/";

/// Query key carrying the API token on every request.
pub const TOKEN_PARAM: &str = "circle-token";

const USER_AGENT: &str = concat!("circleci-api/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Empty query, for requests that only carry the token.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Low-level CircleCI API client.
///
/// Holds the token and an immutable base URL. Entity-specific operations are
/// implemented on the model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use circleci_api::CircleClient;
///
/// # fn example() -> circleci_api::Result<()> {
/// // Create from environment variables
/// let client = CircleClient::from_env()?;
///
/// // Or configure manually
/// let client = CircleClient::new("your-token", "https://circleci.com/api/v1.1/")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CircleClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
}

impl std::fmt::Debug for CircleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircleClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CircleClient {
    /// Create a client from environment variables.
    ///
    /// Uses `CIRCLE_TOKEN` for authentication and optionally `CIRCLE_API_URL`
    /// for the base URL (defaults to `https://circleci.com/api/v1.1/`).
    ///
    /// # Errors
    ///
    /// Returns an error if `CIRCLE_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("CIRCLE_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CircleError::ConfigMissing("CIRCLE_TOKEN environment variable not set".to_string())
            })?;

        let base_url =
            env::var("CIRCLE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(&token, &base_url)
    }

    /// Create a new client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        // Relative paths must resolve below the prefix, not beside it
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(CircleError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: token.to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path against the base URL.
    ///
    /// Absolute `https` URLs (artifact links) and URLs on the base URL's own
    /// origin are kept as they are. Anything else is resolved as a path under
    /// the base URL and never leaves its host.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        match Url::parse(path) {
            Ok(url) if url.scheme() == "https" || url.origin() == self.base_url.origin() => Ok(url),
            // Other schemes and network-path references stay below the base
            Ok(_) => Ok(self.base_url.join(&format!("./{path}"))?),
            Err(_) if is_network_path(path) => Ok(self.base_url.join(&format!("./{path}"))?),
            Err(_) => Ok(self.base_url.join(path)?),
        }
    }

    /// Build an authenticated JSON request.
    ///
    /// `query` is merged into any query string `path` already carries, later
    /// keys overwriting earlier ones. The token is always set last.
    pub fn build_request<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        body: Option<&B>,
    ) -> Result<Request>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;

        let mut builder = self
            .http
            .request(method, url)
            .query(query)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let mut request = builder.build().map_err(CircleError::HttpError)?;
        authorize(request.url_mut(), &self.token);
        Ok(request)
    }

    /// Send a request and return the raw response, whatever its status.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        tracing::debug!(
            method = %request.method(),
            host = request.url().host_str().unwrap_or_default(),
            path = request.url().path(),
            "sending request"
        );

        let response = self
            .http
            .execute(request)
            .await
            .map_err(CircleError::HttpError)?;

        tracing::debug!(status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Make a GET request and check its status.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.get_with_query(path, NO_QUERY).await
    }

    /// Make a GET request with query parameters and check its status.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let request = self.build_request(Method::GET, path, query, None::<&()>)?;
        let response = self.execute(request).await?;
        Self::check_response(response).await
    }

    /// Make a GET request and decode the JSON body.
    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.get_with_query(path, query).await?;
        Self::decode(response).await
    }

    /// Decode a response into `T`.
    ///
    /// Failed responses become [`ApiError`]s; a successful body that does not
    /// match `T` surfaces as [`CircleError::ParseError`].
    pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_response(response).await?;
        let body = response.bytes().await.map_err(CircleError::HttpError)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Check response status and convert failures.
    ///
    /// Every status of 300 or above is a failure.
    pub async fn check_response(response: Response) -> Result<Response> {
        let status = response.status().as_u16();

        if status < 300 {
            return Ok(response);
        }

        let err = match response.bytes().await {
            Ok(body) => ApiError::from_body(status, &body),
            Err(err) => ApiError::unreadable(status, err),
        };

        tracing::debug!(status, message = %err.message, "API request failed");
        Err(err.into())
    }
}

/// `//host/...` (or its backslash spelling) would switch hosts when joined.
fn is_network_path(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('/' | '\\'), Some('/' | '\\'))
    )
}

/// Deduplicate query keys (last value wins, first position kept) and set the
/// token as the final pair.
fn authorize(url: &mut Url, token: &str) {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, value) in url.query_pairs().into_owned() {
        if key == TOKEN_PARAM {
            continue;
        }
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => pairs.push((key, value)),
        }
    }

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(TOKEN_PARAM, token);
}
