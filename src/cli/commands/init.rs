//! init -g - initialize a repository and point origin at the user's GitHub repo

use std::path::Path;

use super::{require_login, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, take_flag, Command, GlobalFlag};
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::{Protocol, RepoRef};

/// `git init` options whose value is the next argument.
const INIT_VALUE_FLAGS: &[&str] = &[
    "--template",
    "--separate-git-dir",
    "-b",
    "--initial-branch",
    "--object-format",
    "--ref-format",
];

/// `init -g [OPTIONS] [DIR]`: `git init`, then `remote add origin` for
/// `LOGIN/NAME` where NAME is the directory's name.
pub(super) fn init(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let mut args = command.args().to_vec();
    if !take_flag(&mut args, "-g") {
        return Ok(Outcome::forward(command.clone()));
    }

    let host = ctx.default_host();
    let login = require_login(ctx, &host)?;

    let dir = positional_indices(&args, INIT_VALUE_FLAGS)
        .first()
        .map(|&i| args[i].clone());
    let name = dir
        .as_deref()
        .and_then(|d| Path::new(d).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| ctx.env().cwd_name())
        .ok_or_else(|| RewriteError::Usage("Usage: hub init -g [DIR]".to_string()))?;

    let url = RepoRef::new(host, login, name).clone_url(Protocol::for_write(ctx.prefers_https()));
    let mut remote = command.derive("remote", ["add", "origin", url.as_str()]);
    if let Some(dir) = dir {
        remote.push_global_flag(GlobalFlag::with_value("-C", dir));
    }

    Ok(Outcome::Forward(
        Plan::single(command.with_args(args)).git(remote),
    ))
}
