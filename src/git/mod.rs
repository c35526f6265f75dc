//! git
//!
//! Read-only access to the repository and git configuration.
//!
//! # Architecture
//!
//! This module is the only place that imports `git2`. It answers the
//! context's queries; it never changes the repository. Commands that do
//! change it are run by git itself, through `cli::exec`.
//!
//! # Example
//!
//! ```no_run
//! use hubwork::context::{Query, RepoSource};
//! use hubwork::core::command::Command;
//! use hubwork::git::{GitSource, RepoLocation};
//! use std::path::Path;
//!
//! let invocation = Command::parse(["status"]);
//! let source = GitSource::open(&RepoLocation::from_command(Path::new("."), &invocation.command));
//! let head = source.query(&Query::HeadRef);
//! ```

mod interface;

pub use interface::{GitError, GitSource, RepoLocation};
