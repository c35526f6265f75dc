//! hub - a git wrapper that speaks GitHub
//!
//! `hub` takes a git command line, rewrites the parts that refer to GitHub
//! (`clone rtomayko/ronn`, `remote add mislav`, `cherry-pick mislav@a319d88`,
//! pull request URLs) into plain git commands, adds a few commands of its own
//! (`create`, `fork`, `pull-request`, `browse`, `compare`) and runs the result.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line layer: builds the context, dispatches, executes
//! - [`context`] - Memoized repository and user facts for one invocation
//! - [`core`] - Command model, outcomes, repository references, settings
//! - [`git`] - Read-only repository access through libgit2
//! - [`forge`] - GitHub API client
//! - [`logging`] - Diagnostic logging setup
//! - [`ui`] - Terminal output helpers
//!
//! # Invariants
//!
//! 1. Rewriting never changes the repository; git does that when the
//!    rewritten commands run
//! 2. A command hub has no rule for reaches git unchanged
//! 3. Every precondition is checked before the first API call

pub mod cli;
pub mod context;
pub mod core;
pub mod forge;
pub mod git;
pub mod logging;
pub mod ui;
