//! forge::github
//!
//! GitHub API client over `reqwest`.
//!
//! # Design
//!
//! [`GitHubApi::request`] is the single place HTTP happens: it builds the URL
//! `{scheme}://{host}/api/v2/json/{path}`, adds basic auth as
//! `LOGIN/token:TOKEN` when credentials are present, sends an optional JSON
//! body and returns the status with the decoded body. Endpoint methods call
//! it and decode the few fields they need.
//!
//! Failures carry the status, the server's message (the body's `error`
//! field, a string or a list of strings) or the canonical reason phrase.
//!
//! # Example
//!
//! ```ignore
//! use hubwork::core::config::ApiSettings;
//! use hubwork::forge::github::GitHubApi;
//! use hubwork::forge::{ApiTarget, CreatePullRequest, Credentials, HostingApi};
//!
//! let api = GitHubApi::new(&ApiSettings::default());
//! let target = ApiTarget::authenticated("github.com", Credentials {
//!     login: "tpw".into(),
//!     token: token.clone(),
//! });
//! let pull = api.create_pull(&target, &base, &CreatePullRequest {
//!     base: "master".into(),
//!     head: "tpw:feature".into(),
//!     title: Some("hereyougo".into()),
//!     issue: None,
//! }).await?;
//! println!("{}", pull.html_url);
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{
    ApiError, ApiTarget, CreatePullRequest, CreateRepoRequest, Endpoint, HostingApi,
    PullRequestCreated, PullRequestHead,
};
use crate::core::config::ApiSettings;
use crate::core::reference::RepoRef;

/// Path prefix of every endpoint.
const API_ROOT: &str = "api/v2/json";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("hub/", env!("CARGO_PKG_VERSION"));

/// A response: status and decoded JSON body (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Body parsed as JSON; `None` when empty or not JSON
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Turn a non-success status into an error.
    pub fn error_for_status(self) -> Result<ApiResponse, ApiError> {
        if (200..300).contains(&self.status) {
            return Ok(self);
        }
        Err(status_error(self.status, self.body.as_ref()))
    }

    /// Decode the body into `T`.
    fn decode<T: for<'de> Deserialize<'de>>(self) -> Result<T, ApiError> {
        let body = self
            .body
            .ok_or_else(|| ApiError::Decode("empty response body".to_string()))?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Build the error for a failed response.
fn status_error(status: u16, body: Option<&Value>) -> ApiError {
    let canonical = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string();

    match body.and_then(|b| b.get("error")) {
        Some(Value::String(message)) => ApiError::Status {
            status,
            reason: message.clone(),
            details: Vec::new(),
        },
        Some(Value::Array(items)) => ApiError::Status {
            status,
            reason: canonical,
            details: items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        },
        _ => ApiError::Status {
            status,
            reason: canonical,
            details: Vec::new(),
        },
    }
}

/// GitHub API client.
pub struct GitHubApi {
    /// HTTP client for making requests
    client: Client,
    /// `https`, or `http` when the settings allow it
    scheme: &'static str,
    /// Replaces `{scheme}://{host}` (test servers, proxies)
    base_url: Option<String>,
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("scheme", &self.scheme)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GitHubApi {
    /// Create a client following the settings' transport policy.
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            client: Client::new(),
            scheme: settings.scheme.as_str(),
            base_url: None,
        }
    }

    /// Send every request to `base_url` regardless of host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            scheme: "https",
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    /// Full URL of an endpoint path on a host.
    pub fn url(&self, host: &str, path: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("{}://{}", self.scheme, host),
        };
        format!("{}/{}/{}", base, API_ROOT, path)
    }

    /// Perform one request.
    ///
    /// Any HTTP status is a successful request; use
    /// [`ApiResponse::error_for_status`] to reject failures.
    pub async fn request(
        &self,
        method: Method,
        target: &ApiTarget,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(&target.host, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(creds) = &target.credentials {
            request = request.basic_auth(format!("{}/token", creds.login), Some(&creds.token));
        }
        request = match body {
            Some(json) => request.json(json),
            None if method == Method::POST => request.body(""),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;
        let status = response.status().as_u16();
        tracing::debug!(%method, %url, status, "api request");

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;
        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        Ok(ApiResponse { status, body })
    }

    async fn call(
        &self,
        target: &ApiTarget,
        endpoint: Endpoint<'_>,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(endpoint.method(), target, &endpoint.path(), body)
            .await?
            .error_for_status()
    }
}

// =========================================================================
// Wire types
// =========================================================================

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreatePullBody<'a> {
    pull: CreatePullFields<'a>,
}

#[derive(Debug, Serialize)]
struct CreatePullFields<'a> {
    base: &'a str,
    head: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullEnvelope<T> {
    pull: T,
}

#[derive(Debug, Deserialize)]
struct CreatedPull {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct PullDetails {
    head: PullHead,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    label: String,
    #[serde(default)]
    repository: Option<HeadRepository>,
}

#[derive(Debug, Deserialize)]
struct HeadRepository {
    #[serde(default)]
    private: bool,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl HostingApi for GitHubApi {
    async fn repo_exists(&self, target: &ApiTarget, repo: &RepoRef) -> Result<bool, ApiError> {
        let endpoint = Endpoint::ShowRepo(repo);
        let response = self
            .request(endpoint.method(), target, &endpoint.path(), None)
            .await?;
        match response.status {
            404 => Ok(false),
            _ => response.error_for_status().map(|_| true),
        }
    }

    async fn create_repo(
        &self,
        target: &ApiTarget,
        request: &CreateRepoRequest,
    ) -> Result<(), ApiError> {
        let body = to_json(&CreateRepoBody {
            name: &request.name,
            public: request.private.then_some("0"),
            description: request.description.as_deref(),
            homepage: request.homepage.as_deref(),
        })?;
        self.call(target, Endpoint::CreateRepo, Some(&body)).await?;
        Ok(())
    }

    async fn fork_repo(&self, target: &ApiTarget, repo: &RepoRef) -> Result<(), ApiError> {
        self.call(target, Endpoint::ForkRepo(repo), None).await?;
        Ok(())
    }

    async fn create_pull(
        &self,
        target: &ApiTarget,
        base_repo: &RepoRef,
        request: &CreatePullRequest,
    ) -> Result<PullRequestCreated, ApiError> {
        let body = to_json(&CreatePullBody {
            pull: CreatePullFields {
                base: &request.base,
                head: &request.head,
                title: request.title.as_deref(),
                issue: request.issue.map(|n| n.to_string()),
            },
        })?;
        let envelope: PullEnvelope<CreatedPull> = self
            .call(target, Endpoint::CreatePull(base_repo), Some(&body))
            .await?
            .decode()?;
        Ok(PullRequestCreated {
            html_url: envelope.pull.html_url,
        })
    }

    async fn pull_head(
        &self,
        target: &ApiTarget,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequestHead, ApiError> {
        let envelope: PullEnvelope<PullDetails> = self
            .call(target, Endpoint::ShowPull(repo, number), None)
            .await?
            .decode()?;
        Ok(PullRequestHead {
            label: envelope.pull.head.label,
            private: envelope.pull.head.repository.map(|r| r.private),
        })
    }
}
