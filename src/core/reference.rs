//! core::reference
//!
//! Repository references: `OWNER/NAME` on a host, the shorthand forms users
//! type, and the remote URLs git stores.
//!
//! # Design
//!
//! Parsing is pure. Anything that depends on configuration (which hosts count
//! as GitHub, what the current login is, ssh host aliases) is supplied by the
//! caller, usually from `context::Context`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// The public GitHub host.
pub const DEFAULT_HOST: &str = "github.com";

/// Transport used in a clone URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `git://host/owner/name.git` (read-only)
    Git,
    /// `git@host:owner/name.git`
    Ssh,
    /// `https://host/owner/name.git`
    Https,
}

impl Protocol {
    /// Protocol for a repository the user only reads.
    ///
    /// Private access always needs ssh. Otherwise an explicit https preference
    /// wins; enterprise hosts default to ssh and github.com to git.
    pub fn for_read(private: bool, prefer_https: bool, host: &str) -> Protocol {
        if private {
            Protocol::Ssh
        } else if prefer_https {
            Protocol::Https
        } else if host.eq_ignore_ascii_case(DEFAULT_HOST) {
            Protocol::Git
        } else {
            Protocol::Ssh
        }
    }

    /// Protocol for a repository the user pushes to.
    pub fn for_write(prefer_https: bool) -> Protocol {
        if prefer_https {
            Protocol::Https
        } else {
            Protocol::Ssh
        }
    }
}

/// A repository on a hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Host name, e.g. `github.com`
    pub host: String,
    /// User or organization
    pub owner: String,
    /// Repository name without `.git`
    pub name: String,
}

impl RepoRef {
    /// Construct a reference.
    pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Same repository name under another owner.
    pub fn with_owner(&self, owner: &str) -> RepoRef {
        RepoRef::new(self.host.clone(), owner, self.name.clone())
    }

    /// Clone URL for the given protocol.
    ///
    /// ```
    /// use hubwork::core::reference::{Protocol, RepoRef};
    ///
    /// let r = RepoRef::new("github.com", "rtomayko", "ronn");
    /// assert_eq!(r.clone_url(Protocol::Git), "git://github.com/rtomayko/ronn.git");
    /// assert_eq!(r.clone_url(Protocol::Ssh), "git@github.com:rtomayko/ronn.git");
    /// ```
    pub fn clone_url(&self, protocol: Protocol) -> String {
        match protocol {
            Protocol::Git => format!("git://{}/{}/{}.git", self.host, self.owner, self.name),
            Protocol::Ssh => format!("git@{}:{}/{}.git", self.host, self.owner, self.name),
            Protocol::Https => format!("https://{}/{}/{}.git", self.host, self.owner, self.name),
        }
    }

    /// Web page of the repository.
    pub fn web_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.name)
    }

    /// Whether two references name the same repository (case-insensitive).
    pub fn same_repo(&self, other: &RepoRef) -> bool {
        self.host.eq_ignore_ascii_case(&other.host)
            && self.owner.eq_ignore_ascii_case(&other.owner)
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A repository a remote points at; wiki remotes are flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// The repository (for wikis, the repository the wiki belongs to)
    pub repo: RepoRef,
    /// The remote URL ended in `.wiki.git`
    pub wiki: bool,
}

/// A repository argument as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shorthand {
    /// `NAME`: one of the user's own repositories
    Name(String),
    /// `OWNER/NAME`
    Owned {
        /// Owner
        owner: String,
        /// Repository name
        name: String,
    },
    /// `HOST:OWNER/NAME`
    Hosted {
        /// Host (or ssh alias, which callers must reject)
        host: String,
        /// Owner
        owner: String,
        /// Repository name
        name: String,
    },
}

fn shorthand_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:([A-Za-z0-9][\w.-]*):)?(?:(\w[\w-]*)/)?(\w[\w.-]*)$")
            .unwrap_or_else(|e| panic!("invalid shorthand pattern: {e}"))
    })
}

fn owner_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\w[\w-]*$").unwrap_or_else(|e| panic!("invalid owner pattern: {e}"))
    })
}

/// Whether `s` looks like a GitHub login.
pub fn is_owner_name(s: &str) -> bool {
    owner_regex().is_match(s)
}

/// Strip a trailing `.git`.
fn strip_git_suffix(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}

impl Shorthand {
    /// Parse a shorthand argument.
    ///
    /// ```
    /// use hubwork::core::reference::Shorthand;
    ///
    /// assert_eq!(Shorthand::parse("resque"), Some(Shorthand::Name("resque".into())));
    /// assert!(matches!(Shorthand::parse("rtomayko/ronn"), Some(Shorthand::Owned { .. })));
    /// assert_eq!(Shorthand::parse("./test"), None);
    /// assert_eq!(Shorthand::parse("git://github.com/a/b.git"), None);
    /// ```
    pub fn parse(arg: &str) -> Option<Shorthand> {
        let caps = shorthand_regex().captures(arg)?;
        let name = strip_git_suffix(caps.get(3)?.as_str()).to_string();
        if name.is_empty() {
            return None;
        }
        let owner = caps.get(2).map(|m| m.as_str().to_string());
        let host = caps.get(1).map(|m| m.as_str().to_string());

        match (host, owner) {
            (Some(host), Some(owner)) => Some(Shorthand::Hosted { host, owner, name }),
            // `server:repo` is an scp-style path, never shorthand
            (Some(_), None) => None,
            (None, Some(owner)) => Some(Shorthand::Owned { owner, name }),
            (None, None) => Some(Shorthand::Name(name)),
        }
    }
}

/// Whether an argument is already a URL or a filesystem path.
pub fn is_qualified(arg: &str) -> bool {
    arg.contains("://")
        || arg.starts_with('.')
        || arg.starts_with('/')
        || arg.starts_with('~')
        || arg.contains('@')
}

/// Remote URL parsing needs to know which hosts count as GitHub.
pub trait HostResolver {
    /// Map an ssh alias to its real host name.
    fn resolve_alias(&self, host: &str) -> String;
    /// Whether `host` is github.com or a configured GitHub host.
    fn is_github_host(&self, host: &str) -> bool;
}

/// Parse a git remote URL into the project it points at.
///
/// Recognizes `git://`, `http(s)://`, `ssh://` and scp-like `user@host:path`
/// forms. Returns `None` for non-GitHub hosts and malformed paths.
pub fn parse_remote_url(url: &str, hosts: &dyn HostResolver) -> Option<Project> {
    let (host, path) = split_remote_url(url)?;
    let host = hosts.resolve_alias(&host);
    if !hosts.is_github_host(&host) {
        return None;
    }

    let path = path.trim_start_matches('/').trim_end_matches('/');
    let mut parts = path.splitn(2, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let rest = parts.next().filter(|s| !s.is_empty() && !s.contains('/'))?;
    let rest = strip_git_suffix(rest);

    let (name, wiki) = match rest.strip_suffix(".wiki") {
        Some(base) => (base, true),
        None => (rest, false),
    };
    if name.is_empty() {
        return None;
    }

    Some(Project {
        repo: RepoRef::new(host, owner, name),
        wiki,
    })
}

/// Split a remote URL into host and path.
fn split_remote_url(url: &str) -> Option<(String, String)> {
    if let Some((_, rest)) = url.split_once("://") {
        let (authority, path) = rest.split_once('/')?;
        let host = authority.rsplit('@').next()?;
        let host = host.split(':').next()?;
        return Some((host.to_lowercase(), path.to_string()));
    }

    // scp-like: [user@]host:path
    let (authority, path) = url.split_once(':')?;
    if authority.contains('/') {
        return None;
    }
    let host = authority.rsplit('@').next()?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_lowercase(), path.to_string()))
}
