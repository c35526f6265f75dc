//! forge::mock
//!
//! Mock hosting API for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a set of existing repositories and pull requests in memory,
//! records every call, and can be told to fail one kind of call. Creating or
//! forking a repository adds it to the set, so a later probe sees it.
//!
//! # Example
//!
//! ```
//! use hubwork::core::reference::RepoRef;
//! use hubwork::forge::mock::{FailOn, MockHostingApi, MockOperation};
//! use hubwork::forge::{ApiError, ApiTarget, HostingApi};
//!
//! # tokio_test::block_on(async {
//! let api = MockHostingApi::new().fail_on(FailOn::ForkRepo(ApiError::Status {
//!     status: 500,
//!     reason: "Your fork is fail".into(),
//!     details: vec![],
//! }));
//! let repo = RepoRef::new("github.com", "defunkt", "hub");
//! let err = api.fork_repo(&ApiTarget::anonymous("github.com"), &repo).await.unwrap_err();
//! assert_eq!(err.to_string(), "Your fork is fail (HTTP 500)");
//! assert_eq!(api.operations().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{
    ApiError, ApiTarget, CreatePullRequest, CreateRepoRequest, HostingApi, PullRequestCreated,
    PullRequestHead,
};
use crate::core::reference::RepoRef;

/// Mock hosting API for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockHostingApi {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockInner {
    /// Existing repositories as `host/owner/name`, lowercased.
    repos: HashSet<String>,
    /// Pull request heads by `host/owner/name#number`.
    pulls: HashMap<String, PullRequestHead>,
    /// Next pull request number to assign.
    next_pull_number: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail repo_exists with the given error.
    RepoExists(ApiError),
    /// Fail create_repo with the given error.
    CreateRepo(ApiError),
    /// Fail fork_repo with the given error.
    ForkRepo(ApiError),
    /// Fail create_pull with the given error.
    CreatePull(ApiError),
    /// Fail pull_head with the given error.
    PullHead(ApiError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    RepoExists {
        repo: RepoRef,
        authenticated: bool,
    },
    CreateRepo {
        host: String,
        login: Option<String>,
        request: CreateRepoRequest,
    },
    ForkRepo {
        repo: RepoRef,
        login: Option<String>,
    },
    CreatePull {
        repo: RepoRef,
        login: Option<String>,
        request: CreatePullRequest,
    },
    PullHead {
        repo: RepoRef,
        number: u64,
    },
}

fn repo_key(repo: &RepoRef) -> String {
    format!("{}/{}/{}", repo.host, repo.owner, repo.name).to_lowercase()
}

fn pull_key(repo: &RepoRef, number: u64) -> String {
    format!("{}#{}", repo_key(repo), number)
}

fn login(target: &ApiTarget) -> Option<String> {
    target.credentials.as_ref().map(|c| c.login.clone())
}

impl MockHostingApi {
    /// Create a new empty mock.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                repos: HashSet::new(),
                pulls: HashMap::new(),
                next_pull_number: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        // A panic while holding the lock only happens inside a failing test.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an existing repository.
    pub fn with_repo(self, host: &str, owner: &str, name: &str) -> Self {
        self.lock()
            .repos
            .insert(repo_key(&RepoRef::new(host, owner, name)));
        self
    }

    /// Add an existing pull request whose head is `label`.
    ///
    /// `private: None` models a head repository that was deleted.
    pub fn with_pull(self, repo: &RepoRef, number: u64, label: &str, private: Option<bool>) -> Self {
        self.lock().pulls.insert(
            pull_key(repo, number),
            PullRequestHead {
                label: label.to_string(),
                private,
            },
        );
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Get recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Whether a repository exists now.
    pub fn has_repo(&self, repo: &RepoRef) -> bool {
        self.lock().repos.contains(&repo_key(repo))
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, expected: &str) -> Result<(), ApiError> {
        match (&self.lock().fail_on, expected) {
            (Some(FailOn::RepoExists(e)), "repo_exists")
            | (Some(FailOn::CreateRepo(e)), "create_repo")
            | (Some(FailOn::ForkRepo(e)), "fork_repo")
            | (Some(FailOn::CreatePull(e)), "create_pull")
            | (Some(FailOn::PullHead(e)), "pull_head") => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockHostingApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        reason: "Not Found".to_string(),
        details: Vec::new(),
    }
}

#[async_trait]
impl HostingApi for MockHostingApi {
    async fn repo_exists(&self, target: &ApiTarget, repo: &RepoRef) -> Result<bool, ApiError> {
        self.record(MockOperation::RepoExists {
            repo: repo.clone(),
            authenticated: target.credentials.is_some(),
        });
        self.check_fail("repo_exists")?;
        Ok(self.has_repo(repo))
    }

    async fn create_repo(
        &self,
        target: &ApiTarget,
        request: &CreateRepoRequest,
    ) -> Result<(), ApiError> {
        self.record(MockOperation::CreateRepo {
            host: target.host.clone(),
            login: login(target),
            request: request.clone(),
        });
        self.check_fail("create_repo")?;

        let (owner, name) = match request.name.split_once('/') {
            Some((owner, name)) => (owner.to_string(), name.to_string()),
            None => (login(target).unwrap_or_default(), request.name.clone()),
        };
        self.lock()
            .repos
            .insert(repo_key(&RepoRef::new(target.host.clone(), owner, name)));
        Ok(())
    }

    async fn fork_repo(&self, target: &ApiTarget, repo: &RepoRef) -> Result<(), ApiError> {
        self.record(MockOperation::ForkRepo {
            repo: repo.clone(),
            login: login(target),
        });
        self.check_fail("fork_repo")?;

        if let Some(owner) = login(target) {
            self.lock().repos.insert(repo_key(&repo.with_owner(&owner)));
        }
        Ok(())
    }

    async fn create_pull(
        &self,
        target: &ApiTarget,
        base_repo: &RepoRef,
        request: &CreatePullRequest,
    ) -> Result<PullRequestCreated, ApiError> {
        self.record(MockOperation::CreatePull {
            repo: base_repo.clone(),
            login: login(target),
            request: request.clone(),
        });
        self.check_fail("create_pull")?;

        let mut inner = self.lock();
        let number = match request.issue {
            Some(issue) => issue,
            None => {
                let n = inner.next_pull_number;
                inner.next_pull_number += 1;
                n
            }
        };
        inner.pulls.insert(
            pull_key(base_repo, number),
            PullRequestHead {
                label: request.head.clone(),
                private: Some(false),
            },
        );
        Ok(PullRequestCreated {
            html_url: format!("{}/pull/{}", base_repo.web_url(), number),
        })
    }

    async fn pull_head(
        &self,
        _target: &ApiTarget,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequestHead, ApiError> {
        self.record(MockOperation::PullHead {
            repo: repo.clone(),
            number,
        });
        self.check_fail("pull_head")?;

        self.lock()
            .pulls
            .get(&pull_key(repo, number))
            .cloned()
            .ok_or_else(not_found)
    }
}
