//! context::env
//!
//! Process environment, read once per invocation.

use std::path::PathBuf;

/// Environment values that influence rewriting.
///
/// Built from the process with [`Environment::from_process`]; tests construct
/// it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// `$GITHUB_USER`, overrides configured logins on every host
    pub github_user: Option<String>,
    /// `$GITHUB_TOKEN`
    pub github_token: Option<String>,
    /// `$GITHUB_HOST`, the default host for new references
    pub github_host: Option<String>,
    /// `$BROWSER`
    pub browser: Option<String>,
    /// `$TMPDIR`
    pub tmpdir: Option<String>,
    /// `$GIT`, the git executable
    pub git_program: String,
    /// `$HUB_CONFIG`
    pub config_path: Option<PathBuf>,
    /// Working directory
    pub cwd: PathBuf,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            github_user: None,
            github_token: None,
            github_host: None,
            browser: None,
            tmpdir: None,
            git_program: "git".to_string(),
            config_path: None,
            cwd: PathBuf::from("/"),
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Environment {
    /// Read the current process environment.
    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self {
            github_user: var("GITHUB_USER"),
            github_token: var("GITHUB_TOKEN"),
            github_host: var("GITHUB_HOST"),
            browser: var("BROWSER"),
            tmpdir: var("TMPDIR"),
            git_program: var("GIT").unwrap_or_else(|| "git".to_string()),
            config_path: var("HUB_CONFIG").map(PathBuf::from),
            cwd: std::env::current_dir()?,
        })
    }

    /// Environment rooted at `cwd` with nothing else set.
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Temporary directory for downloads.
    pub fn tmp_dir(&self) -> PathBuf {
        PathBuf::from(self.tmpdir.as_deref().unwrap_or("/tmp"))
    }

    /// Last component of the working directory.
    pub fn cwd_name(&self) -> Option<String> {
        self.cwd
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_dir_defaults() {
        let env = Environment::default();
        assert_eq!(env.tmp_dir(), PathBuf::from("/tmp"));

        let env = Environment {
            tmpdir: Some("/var/tmp".into()),
            ..Environment::default()
        };
        assert_eq!(env.tmp_dir(), PathBuf::from("/var/tmp"));
    }

    #[test]
    fn cwd_name() {
        assert_eq!(Environment::in_dir("/path/to/hub").cwd_name().as_deref(), Some("hub"));
        assert_eq!(Environment::in_dir("/").cwd_name(), None);
    }
}
