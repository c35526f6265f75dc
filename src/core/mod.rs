//! core
//!
//! Core domain types for hub.
//!
//! # Modules
//!
//! - [`command`] - Command model: global flags, subcommand, arguments
//! - [`outcome`] - What a rewrite produces
//! - [`reference`] - Repository references, shorthand and remote URLs
//! - [`weburl`] - GitHub web URLs and `OWNER@SHA`
//! - [`config`] - Settings file schema and loading
//!
//! # Design Principles
//!
//! - Nothing here touches git, the network or the process environment
//! - Parsing returns `Option`; "not recognized" is not an error

pub mod command;
pub mod config;
pub mod outcome;
pub mod reference;
pub mod weburl;
