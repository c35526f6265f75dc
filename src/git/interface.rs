//! git::interface
//!
//! Repository source backed by `git2`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::context::{Answer, Query, RepoSource, SshConfig};
use crate::core::command::Command;

/// Errors from repository reads.
///
/// These never reach the user: the context treats every failed query as an
/// absent fact. They exist so failures can be logged with a reason.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Configuration could not be opened.
    #[error("config unavailable: {message}")]
    ConfigUnavailable {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Where to look for the repository, from the working directory and the
/// `-C`, `--git-dir` and `--work-tree` global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Effective working directory
    pub cwd: PathBuf,
    /// Explicit git directory
    pub git_dir: Option<PathBuf>,
}

impl RepoLocation {
    /// Apply global flags in order, like git does.
    pub fn from_command(cwd: &Path, command: &Command) -> Self {
        let mut location = RepoLocation {
            cwd: cwd.to_path_buf(),
            git_dir: None,
        };
        for flag in command.global_flags() {
            let Some(value) = flag.value.as_deref() else {
                continue;
            };
            match flag.name.as_str() {
                "-C" => location.cwd = location.cwd.join(value),
                "--git-dir" => location.git_dir = Some(location.cwd.join(value)),
                "--work-tree" => location.cwd = location.cwd.join(value),
                _ => {}
            }
        }
        location
    }
}

/// `RepoSource` reading a repository through libgit2.
pub struct GitSource {
    repo: Option<git2::Repository>,
    cwd: PathBuf,
}

impl std::fmt::Debug for GitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitSource")
            .field("git_dir", &self.repo.as_ref().map(|r| r.path().to_path_buf()))
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl GitSource {
    /// Open the repository for a location; outside a repository only
    /// configuration and filesystem queries are answered.
    pub fn open(location: &RepoLocation) -> Self {
        let repo = match &location.git_dir {
            Some(git_dir) => git2::Repository::open(git_dir),
            None => git2::Repository::discover(&location.cwd),
        };
        let repo = match repo {
            Ok(repo) => Some(repo),
            Err(e) => {
                let err = GitError::NotARepo {
                    path: location.cwd.clone(),
                };
                tracing::debug!(error = %err, cause = e.message(), "no repository");
                None
            }
        };
        Self {
            repo,
            cwd: location.cwd.clone(),
        }
    }

    fn repo(&self) -> Result<&git2::Repository, GitError> {
        self.repo.as_ref().ok_or_else(|| GitError::NotARepo {
            path: self.cwd.clone(),
        })
    }

    fn config(&self) -> Result<git2::Config, GitError> {
        let config = match &self.repo {
            Some(repo) => repo.config(),
            None => git2::Config::open_default(),
        };
        config.map_err(|e| GitError::ConfigUnavailable {
            message: e.message().to_string(),
        })
    }

    fn config_value(&self, key: &str) -> Result<Option<String>, GitError> {
        let mut config = self.config()?;
        let snapshot = config.snapshot()?;
        match snapshot.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, key)),
        }
    }

    fn config_values(&self, key: &str) -> Result<Vec<String>, GitError> {
        let config = self.config()?;
        let mut entries = match config.multivar(key, None) {
            Ok(entries) => entries,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GitError::from_git2(e, key)),
        };
        let mut values = Vec::new();
        while let Some(entry) = entries.next() {
            if let Some(value) = entry?.value() {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }

    fn symbolic_target(&self, refname: &str) -> Result<Option<String>, GitError> {
        let reference = self
            .repo()?
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;
        Ok(reference.symbolic_target().map(str::to_string))
    }

    fn remotes(&self) -> Result<Vec<String>, GitError> {
        let remotes = self.repo()?.remotes()?;
        Ok(remotes.iter().flatten().map(str::to_string).collect())
    }

    fn upstream(&self, branch: &str) -> Result<Option<String>, GitError> {
        let refname = format!("refs/heads/{branch}");
        match self.repo()?.branch_upstream_name(&refname) {
            Ok(buf) => Ok(buf.as_str().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, &refname)),
        }
    }

    /// Non-merge commits reachable from `HEAD` but not from the upstream.
    fn unpushed_commits(&self, upstream: &str) -> Result<usize, GitError> {
        let repo = self.repo()?;
        let refname = format!("refs/remotes/{upstream}");
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk
            .hide_ref(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let mut count = 0;
        for oid in revwalk {
            if repo.find_commit(oid?)?.parent_count() <= 1 {
                count += 1;
            }
        }
        Ok(count)
    }

    fn answer(&self, query: &Query) -> Result<Option<Answer>, GitError> {
        let answer = match query {
            Query::Remotes => Some(Answer::List(self.remotes()?)),
            Query::RemoteUrls(remote) => {
                let urls = self.config_values(&format!("remote.{remote}.url"))?;
                (!urls.is_empty()).then_some(Answer::List(urls))
            }
            Query::HeadRef => self.symbolic_target("HEAD")?.map(Answer::Text),
            Query::Upstream(branch) => self.upstream(branch)?.map(Answer::Text),
            Query::RemoteHead(remote) => self
                .symbolic_target(&format!("refs/remotes/{remote}/HEAD"))?
                .map(Answer::Text),
            Query::Config(key) => self.config_value(key)?.map(Answer::Text),
            Query::ConfigAll(key) => Some(Answer::List(self.config_values(key)?)),
            Query::GitDir => Some(Answer::Text(self.repo()?.path().display().to_string())),
            Query::UnpushedCommits(upstream) => {
                Some(Answer::Count(self.unpushed_commits(upstream)?))
            }
            Query::IsDirectory(path) => Some(Answer::Flag(self.cwd.join(path).is_dir())),
        };
        Ok(answer)
    }
}

impl RepoSource for GitSource {
    fn query(&self, query: &Query) -> Option<Answer> {
        match self.answer(query) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!(?query, error = %e, "query failed");
                None
            }
        }
    }

    fn ssh_config(&self) -> SshConfig {
        SshConfig::load(&SshConfig::default_paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_applies_flags_in_order() {
        let invocation = Command::parse(["-C", "sub", "--git-dir=.git", "status"]);
        let location = RepoLocation::from_command(Path::new("/work"), &invocation.command);
        assert_eq!(location.cwd, PathBuf::from("/work/sub"));
        assert_eq!(location.git_dir, Some(PathBuf::from("/work/sub/.git")));
    }

    #[test]
    fn outside_repository_answers_directories_only() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let source = GitSource::open(&RepoLocation {
            cwd: dir.path().to_path_buf(),
            git_dir: None,
        });
        assert_eq!(source.query(&Query::GitDir), None);
        assert_eq!(source.query(&Query::Remotes), None);
        assert_eq!(
            source.query(&Query::IsDirectory("test".into())),
            Some(Answer::Flag(true))
        );
        assert_eq!(
            source.query(&Query::IsDirectory("missing".into())),
            Some(Answer::Flag(false))
        );
    }
}
