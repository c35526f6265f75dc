//! context::ssh_config
//!
//! `Host`/`HostName` pairs from OpenSSH client configuration, so a remote
//! such as `gh:owner/repo.git` can be recognized as github.com.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Host alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshConfig {
    hosts: HashMap<String, String>,
}

impl SshConfig {
    /// Standard locations: the user's file first, then the system one.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ssh/config"));
        }
        paths.push(PathBuf::from("/etc/ssh/ssh_config"));
        paths
    }

    /// Load and merge files; earlier files win. Unreadable files are skipped.
    pub fn load(paths: &[PathBuf]) -> Self {
        let mut config = SshConfig::default();
        for path in paths {
            config.merge(Self::read(path));
        }
        config
    }

    fn read(path: &Path) -> SshConfig {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "ssh config not read");
                SshConfig::default()
            }
        }
    }

    /// Parse one file.
    ///
    /// ```
    /// use hubwork::context::ssh_config::SshConfig;
    ///
    /// let config = SshConfig::parse("Host gh\n  HostName github.com\n");
    /// assert_eq!(config.resolve("gh"), Some("github.com"));
    /// ```
    pub fn parse(text: &str) -> SshConfig {
        let mut hosts = HashMap::new();
        let mut current: Vec<String> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (keyword, value) = match split_keyword(line) {
                Some(pair) => pair,
                None => continue,
            };

            match keyword.to_ascii_lowercase().as_str() {
                "host" => {
                    current = value
                        .split_whitespace()
                        .filter(|pattern| !pattern.contains(['*', '?', '!']))
                        .map(str::to_lowercase)
                        .collect();
                }
                "match" => current.clear(),
                "hostname" => {
                    for alias in &current {
                        hosts.entry(alias.clone()).or_insert_with(|| value.to_string());
                    }
                }
                _ => {}
            }
        }

        SshConfig { hosts }
    }

    fn merge(&mut self, other: SshConfig) {
        for (alias, host) in other.hosts {
            self.hosts.entry(alias).or_insert(host);
        }
    }

    /// Real host name for an alias.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.hosts.get(&alias.to_lowercase()).map(String::as_str)
    }

    /// Add an alias.
    pub fn insert(&mut self, alias: impl Into<String>, host: impl Into<String>) {
        self.hosts.insert(alias.into().to_lowercase(), host.into());
    }
}

/// `Keyword value` or `Keyword=value`.
fn split_keyword(line: &str) -> Option<(&str, &str)> {
    let end = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let keyword = &line[..end];
    let value = line[end..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == '=')
        .trim();
    if value.is_empty() {
        None
    } else {
        Some((keyword, value))
    }
}
