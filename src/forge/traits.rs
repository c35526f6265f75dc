//! forge::traits
//!
//! Hosting API trait and the request/response types rules work with.
//!
//! # Design
//!
//! The trait is async because every call is network I/O. Responses are
//! decoded into the small structs below at the client boundary, so rules
//! never look at raw JSON. Each endpoint is also described by an
//! [`Endpoint`] so the dispatcher can record what was called.
//!
//! # Example
//!
//! ```
//! use hubwork::core::reference::RepoRef;
//! use hubwork::forge::mock::MockHostingApi;
//! use hubwork::forge::{ApiTarget, HostingApi};
//!
//! # tokio_test::block_on(async {
//! let api = MockHostingApi::new().with_repo("github.com", "xoebus", "hub");
//! let target = ApiTarget::anonymous("github.com");
//! let exists = api
//!     .repo_exists(&target, &RepoRef::new("github.com", "xoebus", "hub"))
//!     .await
//!     .unwrap();
//! assert!(exists);
//! # });
//! ```

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;

use crate::core::reference::RepoRef;

/// Errors from hosting API calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a non-success status.
    ///
    /// `reason` is the server's message when it sent a single one, else the
    /// canonical reason phrase. `details` holds any further messages.
    #[error("{reason} (HTTP {status})")]
    Status {
        /// HTTP status code
        status: u16,
        /// First line of the message
        reason: String,
        /// Additional message lines
        details: Vec<String>,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not what the endpoint returns.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Full message: the summary line followed by detail lines.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { details, .. } if !details.is_empty() => {
                format!("{}\n{}", self, details.join("\n"))
            }
            _ => self.to_string(),
        }
    }
}

/// Login and token for one host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// GitHub login
    pub login: String,
    /// API token
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Which host to call, and as whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTarget {
    /// Host the API lives on
    pub host: String,
    /// Credentials, when the call is authenticated
    pub credentials: Option<Credentials>,
}

impl ApiTarget {
    /// Unauthenticated access to a host.
    pub fn anonymous(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: None,
        }
    }

    /// Authenticated access to a host.
    pub fn authenticated(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials: Some(credentials),
        }
    }
}

/// Request to create a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepoRequest {
    /// `NAME` or `ORG/NAME`
    pub name: String,
    /// Create as private
    pub private: bool,
    /// Description
    pub description: Option<String>,
    /// Homepage URL
    pub homepage: Option<String>,
}

/// Request to create a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    /// Base branch in the base repository
    pub base: String,
    /// `OWNER:BRANCH`
    pub head: String,
    /// Title, when not converting an issue
    pub title: Option<String>,
    /// Issue number to turn into a pull request
    pub issue: Option<u64>,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCreated {
    /// Web URL
    pub html_url: String,
}

/// Head of an existing pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestHead {
    /// `OWNER:BRANCH`
    pub label: String,
    /// Whether the head repository is private; `None` when it was deleted
    pub private: Option<bool>,
}

impl PullRequestHead {
    /// Split the label into owner and branch.
    pub fn owner_and_branch(&self) -> Option<(&str, &str)> {
        self.label
            .split_once(':')
            .filter(|(owner, branch)| !owner.is_empty() && !branch.is_empty())
    }
}

/// An API endpoint, for requests and for the call record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Repository lookup, used as an existence probe
    ShowRepo(&'a RepoRef),
    /// Create a repository for the authenticated user
    CreateRepo,
    /// Fork a repository into the authenticated user's account
    ForkRepo(&'a RepoRef),
    /// Open a pull request against a repository
    CreatePull(&'a RepoRef),
    /// Look up one pull request
    ShowPull(&'a RepoRef, u64),
}

impl Endpoint<'_> {
    /// HTTP method.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ShowRepo(_) | Endpoint::ShowPull(..) => Method::GET,
            Endpoint::CreateRepo | Endpoint::ForkRepo(_) | Endpoint::CreatePull(_) => Method::POST,
        }
    }

    /// Path below `/api/v2/json/`.
    pub fn path(&self) -> String {
        match self {
            Endpoint::ShowRepo(repo) => format!("repos/show/{}/{}", repo.owner, repo.name),
            Endpoint::CreateRepo => "repos/create".to_string(),
            Endpoint::ForkRepo(repo) => format!("repos/fork/{}/{}", repo.owner, repo.name),
            Endpoint::CreatePull(repo) => format!("pulls/{}/{}", repo.owner, repo.name),
            Endpoint::ShowPull(repo, number) => {
                format!("pulls/{}/{}/{}", repo.owner, repo.name, number)
            }
        }
    }
}

/// Client for the hosting service's API.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Whether a repository exists. Works without credentials.
    async fn repo_exists(&self, target: &ApiTarget, repo: &RepoRef) -> Result<bool, ApiError>;

    /// Create a repository owned by the caller (or the organization in
    /// `request.name`).
    async fn create_repo(
        &self,
        target: &ApiTarget,
        request: &CreateRepoRequest,
    ) -> Result<(), ApiError>;

    /// Fork a repository into the caller's account.
    async fn fork_repo(&self, target: &ApiTarget, repo: &RepoRef) -> Result<(), ApiError>;

    /// Open a pull request against `base_repo`.
    async fn create_pull(
        &self,
        target: &ApiTarget,
        base_repo: &RepoRef,
        request: &CreatePullRequest,
    ) -> Result<PullRequestCreated, ApiError>;

    /// Look up a pull request's head.
    async fn pull_head(
        &self,
        target: &ApiTarget,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequestHead, ApiError>;
}
