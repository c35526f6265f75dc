//! context
//!
//! Memoized repository and user facts for one invocation.
//!
//! # Design
//!
//! Every fact about the repository (remotes, branches, configuration) is a
//! [`Query`] answered by a [`RepoSource`]. The [`Context`] asks each query at
//! most once and caches the answer, including the answer "absent": a failed
//! or empty lookup is stored as `None` and never retried. Derived facts (the
//! login for a host, the main project, the tracking branch) are computed from
//! cached queries.
//!
//! The production source is `git::GitSource`; tests use [`fake::FakeRepo`].
//!
//! # Example
//!
//! ```
//! use hubwork::context::{Context, Environment};
//! use hubwork::context::fake::FakeRepo;
//! use hubwork::core::config::Settings;
//!
//! let repo = FakeRepo::github();
//! let ctx = Context::new(Box::new(repo.clone()), Environment::in_dir("/work/hub"), Settings::default());
//! assert_eq!(ctx.current_branch().as_deref(), Some("master"));
//! assert_eq!(ctx.current_branch().as_deref(), Some("master"));
//! assert_eq!(repo.queries_asked(), 1);
//! ```

pub mod env;
pub mod fake;
pub mod ssh_config;

pub use env::Environment;
pub use ssh_config::SshConfig;

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use crate::core::config::Settings;
use crate::core::reference::{parse_remote_url, HostResolver, Project, RepoRef, DEFAULT_HOST};

/// A repository or configuration lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Configured remote names, in configuration order
    Remotes,
    /// All URLs of one remote
    RemoteUrls(String),
    /// Target of the symbolic `HEAD`, e.g. `refs/heads/master`
    HeadRef,
    /// Upstream of a local branch, e.g. `refs/remotes/origin/master`
    Upstream(String),
    /// Branch `refs/remotes/<remote>/HEAD` points at
    RemoteHead(String),
    /// One configuration value (last one wins)
    Config(String),
    /// Every value of a multi-valued key
    ConfigAll(String),
    /// Path of the git directory; absent outside a repository
    GitDir,
    /// Commits on `HEAD` not reachable from `refs/remotes/<upstream>`
    UnpushedCommits(String),
    /// Whether a path names a directory relative to the working directory
    IsDirectory(String),
}

/// Answer to a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A single string
    Text(String),
    /// A list of strings
    List(Vec<String>),
    /// A count
    Count(usize),
    /// A yes/no fact
    Flag(bool),
}

/// Something that can answer repository queries.
///
/// `None` means the fact is absent or could not be determined; the context
/// does not distinguish the two.
pub trait RepoSource {
    /// Answer a query.
    fn query(&self, query: &Query) -> Option<Answer>;

    /// SSH host aliases.
    fn ssh_config(&self) -> SshConfig;
}

/// Remote branch a local branch tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracking {
    /// Remote name
    pub remote: String,
    /// Branch name on the remote
    pub branch: String,
}

impl Tracking {
    /// `remote/branch`.
    pub fn short_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// Memoized facts for one invocation.
pub struct Context {
    source: Box<dyn RepoSource>,
    cache: RefCell<HashMap<Query, Option<Answer>>>,
    ssh: OnceCell<SshConfig>,
    env: Environment,
    settings: Settings,
    overrides: Vec<(String, String)>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cached_queries", &self.cache.borrow().len())
            .field("cwd", &self.env.cwd)
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl Context {
    /// Create a context over a source.
    pub fn new(source: Box<dyn RepoSource>, env: Environment, settings: Settings) -> Self {
        Self {
            source,
            cache: RefCell::new(HashMap::new()),
            ssh: OnceCell::new(),
            env,
            settings,
            overrides: Vec::new(),
        }
    }

    /// Overlay `-c key=value` pairs on configuration lookups.
    pub fn with_config_overrides(mut self, overrides: Vec<(String, String)>) -> Self {
        self.overrides = overrides
            .into_iter()
            .map(|(key, value)| (normalize_key(&key), value))
            .collect();
        self
    }

    /// Process environment.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Settings file.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ask the source once; later calls read the cache.
    fn query(&self, query: Query) -> Option<Answer> {
        if let Some(cached) = self.cache.borrow().get(&query) {
            tracing::trace!(?query, "context cache hit");
            return cached.clone();
        }
        let answer = self.source.query(&query);
        tracing::debug!(?query, found = answer.is_some(), "context query");
        self.cache.borrow_mut().insert(query, answer.clone());
        answer
    }

    fn text(&self, query: Query) -> Option<String> {
        match self.query(query) {
            Some(Answer::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    fn list(&self, query: Query) -> Vec<String> {
        match self.query(query) {
            Some(Answer::List(items)) => items,
            Some(Answer::Text(s)) => vec![s],
            _ => Vec::new(),
        }
    }

    // =========================================================================
    // Raw facts
    // =========================================================================

    /// Whether the invocation runs inside a git repository.
    pub fn in_repository(&self) -> bool {
        self.text(Query::GitDir).is_some()
    }

    /// Remote names.
    pub fn remotes(&self) -> Vec<String> {
        self.list(Query::Remotes)
    }

    /// Whether a remote with this name exists.
    pub fn has_remote(&self, name: &str) -> bool {
        self.remotes().iter().any(|r| r == name)
    }

    /// URLs of a remote.
    pub fn remote_urls(&self, remote: &str) -> Vec<String> {
        self.list(Query::RemoteUrls(remote.to_string()))
    }

    /// Full ref `HEAD` points at, if `HEAD` is symbolic.
    pub fn head_ref(&self) -> Option<String> {
        self.text(Query::HeadRef)
    }

    /// Short name of the current branch.
    pub fn current_branch(&self) -> Option<String> {
        self.head_ref()
            .and_then(|r| r.strip_prefix("refs/heads/").map(str::to_string))
    }

    /// Upstream full ref of a local branch.
    pub fn upstream(&self, branch: &str) -> Option<String> {
        self.text(Query::Upstream(branch.to_string()))
    }

    /// Default branch of a remote, from `refs/remotes/<remote>/HEAD`.
    pub fn remote_default_branch(&self, remote: &str) -> Option<String> {
        let prefix = format!("refs/remotes/{remote}/");
        self.text(Query::RemoteHead(remote.to_string()))
            .map(|target| target.strip_prefix(&prefix).map(str::to_string).unwrap_or(target))
    }

    /// Configuration value; `-c` overrides win.
    pub fn config(&self, key: &str) -> Option<String> {
        let normalized = normalize_key(key);
        if let Some((_, value)) = self.overrides.iter().rev().find(|(k, _)| *k == normalized) {
            return Some(value.clone());
        }
        self.text(Query::Config(key.to_string()))
    }

    /// Every value of a multi-valued key, followed by `-c` overrides.
    pub fn config_all(&self, key: &str) -> Vec<String> {
        let normalized = normalize_key(key);
        let mut values = self.list(Query::ConfigAll(key.to_string()));
        values.extend(
            self.overrides
                .iter()
                .filter(|(k, _)| *k == normalized)
                .map(|(_, v)| v.clone()),
        );
        values
    }

    /// Number of local commits not on `remote/branch`.
    pub fn unpushed_commits(&self, upstream: &str) -> usize {
        match self.query(Query::UnpushedCommits(upstream.to_string())) {
            Some(Answer::Count(n)) => n,
            _ => 0,
        }
    }

    /// Whether `path` is an existing directory.
    pub fn is_directory(&self, path: &str) -> bool {
        matches!(
            self.query(Query::IsDirectory(path.to_string())),
            Some(Answer::Flag(true))
        )
    }

    fn ssh_config(&self) -> &SshConfig {
        self.ssh.get_or_init(|| self.source.ssh_config())
    }

    // =========================================================================
    // Derived facts
    // =========================================================================

    /// Host new references default to: `$GITHUB_HOST` or github.com.
    pub fn default_host(&self) -> String {
        self.env
            .github_host
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Enterprise hosts: `hub.host` values plus `$GITHUB_HOST`.
    pub fn hub_hosts(&self) -> Vec<String> {
        let mut hosts = self.config_all("hub.host");
        if let Some(host) = &self.env.github_host {
            hosts.push(host.clone());
        }
        hosts
    }

    /// Whether an ssh alias of this name is configured.
    pub fn is_ssh_alias(&self, host: &str) -> bool {
        self.ssh_config().resolve(host).is_some()
    }

    /// Login for a host: `$GITHUB_USER`, else `github[.<host>].user`.
    pub fn login(&self, host: &str) -> Option<String> {
        self.env
            .github_user
            .clone()
            .or_else(|| self.config(&host_key(host, "user")))
    }

    /// Token for a host: `$GITHUB_TOKEN`, else `github[.<host>].token`.
    pub fn token(&self, host: &str) -> Option<String> {
        self.env
            .github_token
            .clone()
            .or_else(|| self.config(&host_key(host, "token")))
    }

    /// `hub.protocol` is `https`.
    pub fn prefers_https(&self) -> bool {
        self.config("hub.protocol")
            .is_some_and(|p| p.eq_ignore_ascii_case("https"))
    }

    /// `alias.<name>`.
    pub fn alias(&self, name: &str) -> Option<String> {
        self.config(&format!("alias.{name}"))
    }

    /// Whether `remotes.<name>` defines a remote group.
    pub fn is_remote_group(&self, name: &str) -> bool {
        self.config(&format!("remotes.{name}")).is_some()
    }

    /// Project of a remote: the first of its URLs on a GitHub host.
    pub fn remote_project(&self, remote: &str) -> Option<Project> {
        self.remote_urls(remote)
            .iter()
            .find_map(|url| parse_remote_url(url, self))
    }

    /// Project of `origin`, else of the first remote that has one.
    pub fn main_project(&self) -> Option<Project> {
        if let Some(project) = self.remote_project("origin") {
            return Some(project);
        }
        self.remotes()
            .iter()
            .filter(|name| name.as_str() != "origin")
            .find_map(|name| self.remote_project(name))
    }

    /// Remote whose project belongs to `owner`, else one named `owner`.
    pub fn remote_for_owner(&self, owner: &str) -> Option<String> {
        let remotes = self.remotes();
        remotes
            .iter()
            .find(|name| {
                self.remote_project(name)
                    .is_some_and(|p| p.repo.owner.eq_ignore_ascii_case(owner))
            })
            .or_else(|| remotes.iter().find(|name| name.as_str() == owner))
            .cloned()
    }

    /// Remote branch the current branch tracks.
    pub fn tracking(&self) -> Option<Tracking> {
        let branch = self.current_branch()?;
        self.tracking_of(&branch)
    }

    /// Remote branch a local branch tracks; `None` for local upstreams.
    pub fn tracking_of(&self, branch: &str) -> Option<Tracking> {
        let upstream = self.upstream(branch)?;
        let rest = upstream.strip_prefix("refs/remotes/")?;
        // Remote names may contain '/', so prefer the longest match.
        self.remotes()
            .into_iter()
            .filter_map(|remote| {
                let branch = rest.strip_prefix(remote.as_str())?.strip_prefix('/')?;
                Some(Tracking {
                    branch: branch.to_string(),
                    remote,
                })
            })
            .max_by_key(|t| t.remote.len())
    }

    /// Project the current branch belongs to: the tracking remote's, else the
    /// main project.
    pub fn current_project(&self) -> Option<Project> {
        self.tracking()
            .and_then(|t| self.remote_project(&t.remote))
            .or_else(|| self.main_project())
    }

    /// Repository name for references without one: the main project's name,
    /// else the working directory name.
    pub fn repo_name(&self) -> Option<String> {
        self.main_project()
            .map(|p| p.repo.name)
            .or_else(|| self.env.cwd_name())
    }

    /// Host for references relative to the current repository.
    pub fn project_host(&self) -> String {
        self.main_project()
            .map(|p| p.repo.host)
            .unwrap_or_else(|| self.default_host())
    }

    /// A reference on the project host, e.g. for `remote add USER`.
    pub fn sibling_repo(&self, owner: &str, name: &str) -> RepoRef {
        RepoRef::new(self.project_host(), owner, name)
    }
}

impl HostResolver for Context {
    fn resolve_alias(&self, host: &str) -> String {
        self.ssh_config()
            .resolve(host)
            .map(str::to_string)
            .unwrap_or_else(|| host.to_string())
    }

    fn is_github_host(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(DEFAULT_HOST)
            || self.hub_hosts().iter().any(|h| h.eq_ignore_ascii_case(host))
    }
}

/// `github.user` for github.com, `github.<host>.user` otherwise.
fn host_key(host: &str, key: &str) -> String {
    if host.eq_ignore_ascii_case(DEFAULT_HOST) {
        format!("github.{key}")
    } else {
        format!("github.{host}.{key}")
    }
}

/// Git compares section and key names case-insensitively; subsections keep case.
fn normalize_key(key: &str) -> String {
    match (key.find('.'), key.rfind('.')) {
        (Some(first), Some(last)) if first != last => format!(
            "{}{}{}",
            key[..first].to_lowercase(),
            &key[first..last],
            key[last..].to_lowercase()
        ),
        _ => key.to_lowercase(),
    }
}
