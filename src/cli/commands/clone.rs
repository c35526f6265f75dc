//! clone and submodule add - expand repository shorthand into clone URLs
//!
//! `clone NAME` always clones the user's own repository over ssh, since it is
//! assumed to be pushed to; `submodule add NAME` follows the usual protocol
//! choice.

use super::{replace_arg, shorthand_url, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, take_flag, Command};
use crate::core::outcome::Outcome;

/// `git clone` options whose value is the next argument.
const CLONE_VALUE_FLAGS: &[&str] = &[
    "-o",
    "--origin",
    "-b",
    "--branch",
    "-u",
    "--upload-pack",
    "--reference",
    "--reference-if-able",
    "--depth",
    "--template",
    "-c",
    "--config",
    "--separate-git-dir",
    "-j",
    "--jobs",
    "--filter",
    "--shallow-since",
    "--shallow-exclude",
];

/// `git submodule add` options whose value is the next argument.
const SUBMODULE_VALUE_FLAGS: &[&str] = &["-b", "--branch", "--name", "--reference", "--depth"];

/// `clone [-p] [OPTIONS] REPO [DIR]`.
///
/// Only the repository argument is rewritten; `-p` asks for ssh and is never
/// passed on to git.
pub(super) fn clone(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let mut args = command.args().to_vec();
    let private = take_flag(&mut args, "-p");

    let Some(&index) = positional_indices(&args, CLONE_VALUE_FLAGS).first() else {
        return Ok(Outcome::forward(command.with_args(args)));
    };

    let args = match shorthand_url(ctx, &args[index], private, true)? {
        Some(url) => replace_arg(&args, index, &[url]),
        None => args,
    };
    Ok(Outcome::forward(command.with_args(args)))
}

/// `submodule [OPTIONS] add [-p] [OPTIONS] REPO [PATH]`.
pub(super) fn submodule(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let mut args = command.args().to_vec();
    let Some(add) = args.iter().position(|a| a == "add") else {
        return Ok(Outcome::forward(command.clone()));
    };

    let mut rest = args.split_off(add + 1);
    let private = take_flag(&mut rest, "-p");

    let rest = match positional_indices(&rest, SUBMODULE_VALUE_FLAGS).first() {
        Some(&index) => match shorthand_url(ctx, &rest[index], private, false)? {
            Some(url) => replace_arg(&rest, index, &[url]),
            None => rest,
        },
        None => rest,
    };
    args.extend(rest);
    Ok(Outcome::forward(command.with_args(args)))
}
