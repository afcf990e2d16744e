//! Core GitHub client implementation.

use crate::error::{ClientError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned by this client.
const API_VERSION: &str = "2022-11-28";

const DEFAULT_USER_AGENT: &str = concat!("github-client/", env!("CARGO_PKG_VERSION"));

/// A client for the GitHub REST API.
///
/// Cheap to clone; clones share the underlying connection pool, so a single
/// instance can serve many concurrent callers.
///
/// # Example
///
/// ```no_run
/// use github_client::{Client, NewRepository, RepositoryOwner};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://api.github.com")?
///     .with_token("ghp_example")
///     .with_timeout(Duration::from_secs(30))?;
///
/// let repo = client
///     .create_repository(&RepositoryOwner::AuthenticatedUser, &NewRepository::new("svc-a"))
///     .await?;
/// println!("created {}", repo.html_url.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL of the API, without trailing slash.
    base_url: String,
    /// HTTP client.
    http: HttpClient,
    /// Optional token sent as a bearer credential.
    token: Option<String>,
    /// User agent header; GitHub rejects requests without one.
    user_agent: String,
}

impl Client {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Set the token used for authentication.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom timeout for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = HttpClient::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, &self.user_agent);

        match self.token {
            Some(ref token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Response> {
        let request = self.with_headers(self.http.get(self.url(path)));
        request.send().await.map_err(ClientError::Http)
    }

    pub(crate) async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let request = self.with_headers(self.http.post(self.url(path))).json(body);
        request.send().await.map_err(ClientError::Http)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Response> {
        let request = self.with_headers(self.http.delete(self.url(path)));
        request.send().await.map_err(ClientError::Http)
    }

    /// Handle a response and deserialize JSON.
    pub(crate) async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(error_from_response(status, response).await)
        }
    }

    /// Handle a response that returns no body (204 No Content).
    pub(crate) async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() || status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(error_from_response(status, response).await)
        }
    }
}

async fn error_from_response(status: StatusCode, response: Response) -> ClientError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    classify_error(status.as_u16(), &body)
}

/// Turn a non-success GitHub response into a [`ClientError`].
///
/// GitHub reports validation problems as a top-level `message` plus an
/// `errors` array; both are folded into the message so callers can see
/// why a request was rejected.
pub(crate) fn classify_error(status: u16, body: &str) -> ClientError {
    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let mut parts: Vec<String> = Vec::new();
            if let Some(message) = json["message"].as_str() {
                parts.push(message.to_string());
            }
            if let Some(errors) = json["errors"].as_array() {
                parts.extend(errors.iter().filter_map(|e| {
                    e["message"]
                        .as_str()
                        .or_else(|| e["code"].as_str())
                        .map(str::to_string)
                }));
            }
            if parts.is_empty() {
                body.to_string()
            } else {
                parts.join(": ")
            }
        }
        Err(_) => body.to_string(),
    };

    match status {
        404 => ClientError::NotFound(message),
        422 if message.contains("already exists") => ClientError::AlreadyExists(message),
        _ => ClientError::Api { status, message },
    }
}
