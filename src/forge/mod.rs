//! forge
//!
//! Client for the GitHub API.
//!
//! # Architecture
//!
//! Rules talk to the [`HostingApi`] trait and never to HTTP directly. API
//! calls happen only after a rule's local preconditions hold (inside a
//! repository, credentials present), and a failed call becomes a user-facing
//! message rather than a partial command.
//!
//! # Modules
//!
//! - `traits`: the `HostingApi` trait and request/response types
//! - [`github`]: implementation over `reqwest`
//! - [`mock`]: in-memory implementation for tests

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
