//! remote add - name a remote after a GitHub user and fill in its URL

use super::{read_protocol, replace_arg, require_login, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, take_flag, Command};
use crate::core::outcome::Outcome;
use crate::core::reference::{is_owner_name, is_qualified, HostResolver, RepoRef, Shorthand};

/// `git remote add` options whose value is the next argument.
const REMOTE_ADD_VALUE_FLAGS: &[&str] = &["-t", "--track", "-m", "--master"];

/// `remote add [-p] [OPTIONS] USER[/REPO]` or `remote add [-p] [OPTIONS] NAME USER[/REPO]`.
///
/// With one argument the remote is named after the owner (`origin` means the
/// user's own fork). The repository name defaults to the current project's.
pub(super) fn remote(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let args = command.args();
    if args.first().map(String::as_str) != Some("add") {
        return Ok(Outcome::forward(command.clone()));
    }

    let mut rest = args[1..].to_vec();
    let private = take_flag(&mut rest, "-p");
    let positions = positional_indices(&rest, REMOTE_ADD_VALUE_FLAGS);

    // `-p` is hub's own flag and never reaches git, rewritten or not.
    let rewritten = match positions.as_slice() {
        [name] => match single_target(ctx, &rest[*name])? {
            Some((remote, repo)) => {
                let url = repo.clone_url(read_protocol(ctx, private, &repo.host));
                replace_arg(&rest, *name, &[remote, url])
            }
            None => rest,
        },
        [_, target] => match explicit_target(ctx, &rest[*target]) {
            Some(repo) => {
                let url = repo.clone_url(read_protocol(ctx, private, &repo.host));
                replace_arg(&rest, *target, &[url])
            }
            None => rest,
        },
        _ => rest,
    };

    let out = std::iter::once(args[0].clone()).chain(rewritten);
    Ok(Outcome::forward(command.with_args(out)))
}

/// `remote add USER` / `remote add USER/REPO`: remote name and repository.
fn single_target(ctx: &Context, arg: &str) -> Result<Option<(String, RepoRef)>, RewriteError> {
    if is_qualified(arg) {
        return Ok(None);
    }
    match Shorthand::parse(arg) {
        Some(Shorthand::Name(name)) if is_owner_name(&name) => {
            let Some(repo_name) = ctx.repo_name() else {
                return Ok(None);
            };
            let owner = if name == "origin" {
                require_login(ctx, &ctx.project_host())?
            } else {
                name.clone()
            };
            Ok(Some((name, ctx.sibling_repo(&owner, &repo_name))))
        }
        Some(Shorthand::Owned { owner, name }) => {
            let repo = ctx.sibling_repo(&owner, &name);
            Ok(Some((owner, repo)))
        }
        _ => Ok(None),
    }
}

/// `remote add NAME TARGET`: the repository TARGET names, if it is shorthand.
fn explicit_target(ctx: &Context, arg: &str) -> Option<RepoRef> {
    if is_qualified(arg) {
        return None;
    }
    match Shorthand::parse(arg)? {
        Shorthand::Name(owner) if is_owner_name(&owner) => {
            Some(ctx.sibling_repo(&owner, &ctx.repo_name()?))
        }
        Shorthand::Owned { owner, name } => Some(ctx.sibling_repo(&owner, &name)),
        Shorthand::Hosted { host, owner, name }
            if ctx.is_github_host(&host) && !ctx.is_ssh_alias(&host) =>
        {
            Some(RepoRef::new(host, owner, name))
        }
        _ => None,
    }
}
