//! cli
//!
//! Command-line layer for hub.
//!
//! # Responsibilities
//!
//! - Split the command line into global flags, subcommand and arguments
//! - Build the repository [`Context`] and the API client
//! - Rewrite through [`commands::dispatch`] and execute the result
//!
//! # Architecture
//!
//! Rewriting is pure apart from git queries and API calls; everything that
//! touches the terminal or spawns processes happens in [`exec`] afterwards.
//! The hub-only commands parse their own arguments with clap ([`args`]);
//! every other command keeps git's grammar.

pub mod args;
pub mod commands;
pub mod exec;

use anyhow::{Context as _, Result};

use crate::context::{Context, Environment};
use crate::core::command::{Command, GlobalFlag};
use crate::core::config::SettingsFile;
use crate::forge::github::GitHubApi;
use crate::git::{GitSource, RepoLocation};
use exec::Executor;

/// Run hub with the arguments after the program name.
///
/// Returns the exit code to use. This is the entry point called from
/// `main.rs`.
pub fn run<I, S>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let invocation = Command::parse(argv);
    let command = invocation.command;

    let env = Environment::from_process().context("cannot read the working directory")?;
    let settings = SettingsFile::load(env.config_path.as_deref())?;
    if let Some(path) = &settings.path {
        tracing::debug!(path = %path.display(), "settings loaded");
    }

    let source = GitSource::open(&RepoLocation::from_command(&env.cwd, &command));
    let git = env.git_program.clone();
    let ctx = Context::new(Box::new(source), env, settings.settings)
        .with_config_overrides(config_overrides(command.global_flags()));
    let api = GitHubApi::new(&ctx.settings().api);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let outcome = runtime.block_on(commands::dispatch(&ctx, &api, command));

    Executor::new(git, invocation.noop).execute(&outcome)
}

/// `-c key=value` global flags; a bare `-c key` sets `true` like git does.
fn config_overrides(flags: &[GlobalFlag]) -> Vec<(String, String)> {
    flags
        .iter()
        .filter(|f| f.name == "-c")
        .filter_map(|f| f.value.as_deref())
        .map(|value| match value.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (value.to_string(), "true".to_string()),
        })
        .collect()
}
