//! core::weburl
//!
//! GitHub web URLs users paste on the command line: pull requests, commits,
//! issues and gists, plus the `OWNER@SHA` commit notation.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

use super::reference::{HostResolver, RepoRef};

/// What a GitHub web URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebTarget {
    /// `/OWNER/REPO/pull/N`, optionally with `/files` or `/commits`
    Pull {
        /// Repository the pull request belongs to
        repo: RepoRef,
        /// Pull request number
        number: u64,
    },
    /// `/OWNER/REPO/commit/SHA`
    Commit {
        /// Repository
        repo: RepoRef,
        /// Commit id as written
        sha: String,
    },
    /// `/OWNER/REPO/issues/N`
    Issue {
        /// Repository
        repo: RepoRef,
        /// Issue number
        number: u64,
    },
    /// `gist.HOST/[USER/]ID`
    Gist {
        /// Gist id
        id: String,
    },
}

/// A parsed web URL: the target and the URL without its fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebUrl {
    /// What the URL points at
    pub target: WebTarget,
    /// Scheme as written (`http` or `https`)
    pub scheme: String,
    /// Host as written
    pub host: String,
    /// The URL with query and fragment removed
    pub base: String,
}

impl WebUrl {
    /// Parse a URL; `None` unless it is a recognized GitHub page.
    ///
    /// ```
    /// use hubwork::core::reference::{HostResolver, DEFAULT_HOST};
    /// use hubwork::core::weburl::{WebTarget, WebUrl};
    ///
    /// struct GitHubOnly;
    /// impl HostResolver for GitHubOnly {
    ///     fn resolve_alias(&self, host: &str) -> String { host.to_string() }
    ///     fn is_github_host(&self, host: &str) -> bool { host == DEFAULT_HOST }
    /// }
    ///
    /// let url = WebUrl::parse("https://github.com/defunkt/hub/pull/55#comment", &GitHubOnly).unwrap();
    /// assert!(matches!(url.target, WebTarget::Pull { number: 55, .. }));
    /// assert_eq!(url.base, "https://github.com/defunkt/hub/pull/55");
    /// ```
    pub fn parse(input: &str, hosts: &dyn HostResolver) -> Option<WebUrl> {
        let url = Url::parse(input).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_lowercase();
        let segments: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();

        let target = match host.strip_prefix("gist.") {
            Some(base_host) if hosts.is_github_host(base_host) => match segments.as_slice() {
                [id] | [_, id] => WebTarget::Gist { id: id.to_string() },
                _ => return None,
            },
            _ if hosts.is_github_host(&host) => parse_repo_page(&host, &segments)?,
            _ => return None,
        };

        let mut base = url.clone();
        base.set_fragment(None);
        base.set_query(None);
        let base = base.as_str().trim_end_matches('/').to_string();

        Some(WebUrl {
            target,
            scheme: url.scheme().to_string(),
            host,
            base,
        })
    }
}

fn parse_repo_page(host: &str, segments: &[&str]) -> Option<WebTarget> {
    let (owner, name, kind, id) = match segments {
        [owner, name, kind, id] | [owner, name, kind, id, _] => (*owner, *name, *kind, *id),
        _ => return None,
    };
    let repo = RepoRef::new(host, owner, name);

    match (kind, segments.len()) {
        ("pull", 4) => id.parse().ok().map(|number| WebTarget::Pull { repo, number }),
        ("pull", 5) if matches!(segments[4], "files" | "commits") => {
            id.parse().ok().map(|number| WebTarget::Pull { repo, number })
        }
        ("commit", 4) if is_sha(id) => Some(WebTarget::Commit {
            repo,
            sha: id.to_string(),
        }),
        ("issues", 4) => id.parse().ok().map(|number| WebTarget::Issue { repo, number }),
        _ => None,
    }
}

fn sha_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{7,40}$").unwrap_or_else(|e| panic!("invalid sha pattern: {e}"))
    })
}

fn user_sha_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\w[\w-]*)@([0-9a-f]{7,40})$")
            .unwrap_or_else(|e| panic!("invalid commit notation pattern: {e}"))
    })
}

/// Whether `s` is an abbreviated or full commit id.
pub fn is_sha(s: &str) -> bool {
    sha_regex().is_match(s)
}

/// Parse `OWNER@SHA` into owner and commit id.
///
/// `OWNER/REPO@SHA` and ids shorter than seven characters are not accepted.
///
/// ```
/// use hubwork::core::weburl::parse_user_sha;
///
/// assert_eq!(parse_user_sha("mislav@368af20"), Some(("mislav".into(), "368af20".into())));
/// assert_eq!(parse_user_sha("mislav/hubbub@a319d88"), None);
/// assert_eq!(parse_user_sha("mislav@a319"), None);
/// ```
pub fn parse_user_sha(arg: &str) -> Option<(String, String)> {
    let caps = user_sha_regex().captures(arg)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}
