//! fetch - add remotes for GitHub users before fetching from them
//!
//! `fetch USER` and `fetch USER1,USER2` add a remote for every name that is
//! not already a remote or a remote group, provided the user's fork of the
//! current repository exists. Names the API reports as missing are still
//! passed to git, which reports them; a failed check aborts the whole command.

use super::{read_protocol, read_target, replace_arg, ApiSession, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, Command};
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::is_owner_name;

/// `git fetch` options whose value is the next argument.
const FETCH_VALUE_FLAGS: &[&str] = &[
    "--depth",
    "--deepen",
    "--shallow-since",
    "--shallow-exclude",
    "--upload-pack",
    "-j",
    "--jobs",
    "--refmap",
    "-o",
    "--server-option",
    "--negotiation-tip",
];

pub(super) async fn fetch(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
) -> Result<Outcome, RewriteError> {
    let args = command.args().to_vec();
    let positions = positional_indices(&args, FETCH_VALUE_FLAGS);
    let Some(&first) = positions.first() else {
        return Ok(Outcome::forward(command.clone()));
    };

    let (args, names) = if args.iter().any(|a| a == "--multiple") {
        let names: Vec<String> = positions.iter().map(|&i| args[i].clone()).collect();
        (args, names)
    } else if args[first].contains(',') {
        let names: Vec<String> = args[first]
            .split(',')
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        let with: Vec<String> = std::iter::once("--multiple".to_string())
            .chain(names.iter().cloned())
            .collect();
        (replace_arg(&args, first, &with), names)
    } else {
        let name = args[first].clone();
        (args, vec![name])
    };

    let mut plan = Plan::default();
    for name in &names {
        if let Some(add) = new_remote(ctx, api, command, name).await? {
            plan = plan.git(add);
        }
    }

    Ok(Outcome::Forward(plan.git(command.with_args(args))))
}

/// `remote add NAME URL` if NAME is a user whose fork exists.
async fn new_remote(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
    name: &str,
) -> Result<Option<Command>, RewriteError> {
    if !is_owner_name(name) || ctx.has_remote(name) || ctx.is_remote_group(name) {
        return Ok(None);
    }
    let Some(repo_name) = ctx.repo_name() else {
        return Ok(None);
    };

    let repo = ctx.sibling_repo(name, &repo_name);
    let exists = api
        .repo_exists(&read_target(ctx, &repo.host), &repo)
        .await
        .map_err(|e| RewriteError::api("fetching remote", e))?;
    if !exists {
        tracing::debug!(%repo, "no such fork");
        return Ok(None);
    }

    let url = repo.clone_url(read_protocol(ctx, false, &repo.host));
    Ok(Some(command.derive("remote", ["add".to_string(), name.to_string(), url])))
}
