//! checkout - check out a pull request from its URL
//!
//! `checkout PULL-URL [BRANCH]` looks up the pull request's head, fetches it
//! from a remote named after the head owner (adding that remote when it does
//! not exist yet) and checks it out as a tracking branch.

use super::{read_protocol, read_target, replace_arg, ApiSession, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, Command};
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::Protocol;
use crate::core::weburl::{WebTarget, WebUrl};

/// `git checkout` options whose value is the next argument.
const CHECKOUT_VALUE_FLAGS: &[&str] = &["-b", "-B", "--orphan", "--conflict"];

pub(super) async fn checkout(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
) -> Result<Outcome, RewriteError> {
    let args = command.args();
    let positions = positional_indices(args, CHECKOUT_VALUE_FLAGS);

    let pull = positions.iter().enumerate().find_map(|(nth, &index)| {
        match WebUrl::parse(&args[index], ctx)?.target {
            WebTarget::Pull { repo, number } => Some((nth, index, repo, number)),
            _ => None,
        }
    });
    let Some((nth, index, repo, number)) = pull else {
        return Ok(Outcome::forward(command.clone()));
    };

    let head = api
        .pull_head(&read_target(ctx, &repo.host), &repo, number)
        .await
        .map_err(|e| RewriteError::api("fetching pull request", e))?;
    let Some(private) = head.private else {
        let owner = head
            .owner_and_branch()
            .map(|(owner, _)| owner)
            .unwrap_or(head.label.as_str());
        return Err(RewriteError::Aborted(format!(
            "Error: {owner}'s repository is unavailable"
        )));
    };
    let (owner, branch) = head.owner_and_branch().ok_or_else(|| {
        RewriteError::Aborted(format!("Error: unexpected pull request head {}", head.label))
    })?;
    tracing::debug!(owner, branch, private, "pull request head");

    let fetch = if ctx.has_remote(owner) {
        let refspec = format!("+refs/heads/{branch}:refs/remotes/{owner}/{branch}");
        Plan::single(command.derive("remote", ["set-branches", "--add", owner, branch]))
            .git(command.derive("fetch", [owner, refspec.as_str()]))
    } else {
        let fork = repo.with_owner(owner);
        let protocol = if private {
            Protocol::Ssh
        } else {
            read_protocol(ctx, false, &fork.host)
        };
        let url = fork.clone_url(protocol);
        Plan::single(command.derive("remote", ["add", "-f", "-t", branch, owner, url.as_str()]))
    };

    // A positional after the URL names the local branch.
    let custom = positions.get(nth + 1).copied();
    let local = match custom {
        Some(i) => args[i].clone(),
        None => format!("{owner}-{branch}"),
    };
    let mut rest = args.to_vec();
    if let Some(i) = custom {
        rest.remove(i);
    }
    let tracking = [
        "--track".to_string(),
        "-B".to_string(),
        local,
        format!("{owner}/{branch}"),
    ];
    let checkout = command.with_args(replace_arg(&rest, index, &tracking));

    Ok(Outcome::Forward(fetch.git(checkout)))
}
