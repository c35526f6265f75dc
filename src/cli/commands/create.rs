//! create - create the current repository on GitHub and add it as origin

use super::{credentials, ApiSession, RewriteError};
use crate::cli::args::{self, CreateArgs};
use crate::context::Context;
use crate::core::command::Command;
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::{Protocol, RepoRef};
use crate::forge::{ApiTarget, CreateRepoRequest};

/// `create [NAME|OWNER/NAME] [-p] [-d DESCRIPTION] [-h HOMEPAGE]`.
///
/// An existing repository is not an error: it is reported and still added
/// as the origin remote.
pub(super) async fn create(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
) -> Result<Outcome, RewriteError> {
    if !ctx.in_repository() {
        return Err(RewriteError::NotInRepository(
            "'create' must be run from inside a git repository".to_string(),
        ));
    }

    let args: CreateArgs = args::parse(command.args(), CreateArgs::USAGE)?;
    let host = ctx.default_host();
    let creds = credentials(ctx, &host)?;

    let (owner, name) = match args.name.as_deref().and_then(|n| n.split_once('/')) {
        Some((owner, name)) => (owner.to_string(), name.to_string()),
        None => {
            let name = match args.name.clone() {
                Some(name) => name,
                None => ctx.repo_name().ok_or_else(|| {
                    RewriteError::Usage(CreateArgs::USAGE.to_string())
                })?,
            };
            (creds.login.clone(), name)
        }
    };
    let repo = RepoRef::new(host.clone(), owner, name);
    let target = ApiTarget::authenticated(host.clone(), creds);

    let exists = api
        .repo_exists(&target, &repo)
        .await
        .map_err(|e| RewriteError::api("creating repository", e))?;

    let mut plan = Plan::default();
    let action = if exists {
        plan.notices
            .push(format!("{} already exists on {}", repo.full_name(), host));
        "set remote origin"
    } else {
        let request = CreateRepoRequest {
            name: args.name.clone().unwrap_or_else(|| repo.name.clone()),
            private: args.private,
            description: args.description,
            homepage: args.homepage,
        };
        api.create_repo(&target, &request)
            .await
            .map_err(|e| RewriteError::api("creating repository", e))?;
        "created repository"
    };

    let step = if ctx.has_remote("origin") {
        command.derive("remote", ["-v"])
    } else {
        let url = repo.clone_url(Protocol::for_write(ctx.prefers_https()));
        command.derive("remote", ["add", "-f", "origin", url.as_str()])
    };

    Ok(Outcome::Forward(
        plan.git(step).then_print(format!("{action}: {}", repo.full_name())),
    ))
}
