//! context::fake
//!
//! In-memory repository source for tests.
//!
//! # Design
//!
//! A `FakeRepo` is a table of query answers built with chained `with_*`
//! calls. Unlisted queries answer `None`, the same as a failed lookup. Clones
//! share the log of queries asked, so a test can hand one clone to a
//! `Context` and inspect the other.
//!
//! # Example
//!
//! ```
//! use hubwork::context::fake::FakeRepo;
//! use hubwork::context::{Answer, Query, RepoSource};
//!
//! let repo = FakeRepo::github().with_config("hub.protocol", "https");
//! assert_eq!(
//!     repo.query(&Query::Config("hub.protocol".into())),
//!     Some(Answer::Text("https".into()))
//! );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Answer, Query, RepoSource, SshConfig};

/// Repository source backed by a table of answers.
#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    answers: HashMap<Query, Answer>,
    ssh: SshConfig,
    asked: Arc<Mutex<Vec<Query>>>,
}

impl FakeRepo {
    /// Nothing at all: not inside a repository, no configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A checkout of `defunkt/hub` on `master` tracking `origin/master`, with
    /// a second remote `mislav`, logged in as `tpw` with token `abc123`.
    pub fn github() -> Self {
        Self::new()
            .with_git_dir(".git")
            .with_remote("mislav", &["git://github.com/mislav/hub.git"])
            .with_remote("origin", &["git://github.com/defunkt/hub.git"])
            .with_head("master")
            .with_upstream("master", "refs/remotes/origin/master")
            .with_config("github.user", "tpw")
            .with_config("github.token", "abc123")
    }

    /// Set an answer directly.
    pub fn with_answer(mut self, query: Query, answer: Answer) -> Self {
        self.answers.insert(query, answer);
        self
    }

    /// Remove an answer.
    pub fn without(mut self, query: &Query) -> Self {
        self.answers.remove(query);
        self
    }

    /// Mark the working directory as a repository.
    pub fn with_git_dir(self, path: &str) -> Self {
        self.with_answer(Query::GitDir, Answer::Text(path.to_string()))
    }

    /// Outside any repository: no git dir, remotes or branches.
    pub fn outside_repository(mut self) -> Self {
        self.answers.retain(|query, _| {
            matches!(query, Query::Config(_) | Query::ConfigAll(_) | Query::IsDirectory(_))
        });
        self
    }

    /// Add a remote (or replace its URLs); order of first addition is kept.
    pub fn with_remote(mut self, name: &str, urls: &[&str]) -> Self {
        let mut remotes = match self.answers.remove(&Query::Remotes) {
            Some(Answer::List(names)) => names,
            _ => Vec::new(),
        };
        if !remotes.iter().any(|r| r == name) {
            remotes.push(name.to_string());
        }
        self.answers.insert(Query::Remotes, Answer::List(remotes));
        self.with_answer(
            Query::RemoteUrls(name.to_string()),
            Answer::List(urls.iter().map(|u| u.to_string()).collect()),
        )
    }

    /// Remove every remote.
    pub fn without_remotes(mut self) -> Self {
        self.answers
            .retain(|query, _| !matches!(query, Query::Remotes | Query::RemoteUrls(_)));
        self
    }

    /// Check out a local branch.
    pub fn with_head(self, branch: &str) -> Self {
        self.with_answer(Query::HeadRef, Answer::Text(format!("refs/heads/{branch}")))
    }

    /// Detach `HEAD`.
    pub fn detached(self) -> Self {
        self.without(&Query::HeadRef)
    }

    /// Set the upstream of a local branch (a full ref).
    pub fn with_upstream(self, branch: &str, upstream: &str) -> Self {
        self.with_answer(
            Query::Upstream(branch.to_string()),
            Answer::Text(upstream.to_string()),
        )
    }

    /// Point `refs/remotes/<remote>/HEAD` at a branch.
    pub fn with_remote_head(self, remote: &str, branch: &str) -> Self {
        self.with_answer(
            Query::RemoteHead(remote.to_string()),
            Answer::Text(format!("refs/remotes/{remote}/{branch}")),
        )
    }

    /// Set a configuration value.
    pub fn with_config(self, key: &str, value: &str) -> Self {
        self.with_answer(Query::Config(key.to_string()), Answer::Text(value.to_string()))
    }

    /// Unset a configuration value.
    pub fn without_config(self, key: &str) -> Self {
        self.without(&Query::Config(key.to_string()))
    }

    /// Set every value of a multi-valued key.
    pub fn with_config_all(self, key: &str, values: &[&str]) -> Self {
        self.with_answer(
            Query::ConfigAll(key.to_string()),
            Answer::List(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    /// Commits ahead of `remote/branch`.
    pub fn with_unpushed(self, upstream: &str, count: usize) -> Self {
        self.with_answer(
            Query::UnpushedCommits(upstream.to_string()),
            Answer::Count(count),
        )
    }

    /// Declare an existing directory.
    pub fn with_directory(self, path: &str) -> Self {
        self.with_answer(Query::IsDirectory(path.to_string()), Answer::Flag(true))
    }

    /// Add an ssh host alias.
    pub fn with_ssh_alias(mut self, alias: &str, host: &str) -> Self {
        self.ssh.insert(alias, host);
        self
    }

    /// Number of queries asked so far, across clones.
    pub fn queries_asked(&self) -> usize {
        self.asked.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Queries asked so far, in order.
    pub fn queries(&self) -> Vec<Query> {
        self.asked.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl RepoSource for FakeRepo {
    fn query(&self, query: &Query) -> Option<Answer> {
        if let Ok(mut log) = self.asked.lock() {
            log.push(query.clone());
        }
        self.answers.get(query).cloned()
    }

    fn ssh_config(&self) -> SshConfig {
        self.ssh.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remotes_keep_insertion_order() {
        let repo = FakeRepo::new()
            .with_remote("b", &["x"])
            .with_remote("a", &["y"])
            .with_remote("b", &["z"]);
        assert_eq!(
            repo.query(&Query::Remotes),
            Some(Answer::List(vec!["b".into(), "a".into()]))
        );
        assert_eq!(
            repo.query(&Query::RemoteUrls("b".into())),
            Some(Answer::List(vec!["z".into()]))
        );
    }

    #[test]
    fn outside_repository_keeps_config() {
        let repo = FakeRepo::github().outside_repository();
        assert_eq!(repo.query(&Query::GitDir), None);
        assert_eq!(repo.query(&Query::Remotes), None);
        assert!(repo.query(&Query::Config("github.user".into())).is_some());
    }

    #[test]
    fn clones_share_the_log() {
        let repo = FakeRepo::new();
        let other = repo.clone();
        other.query(&Query::HeadRef);
        assert_eq!(repo.queries(), vec![Query::HeadRef]);
    }
}
