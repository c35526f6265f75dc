//! pull-request - open a pull request for the current branch
//!
//! # Design
//!
//! The base defaults to the origin project's default branch; the head
//! defaults to the branch the current branch tracks, or to the current branch
//! in the user's fork when it tracks nothing. Every local check (same branch,
//! unpushed commits, missing title) runs before the API is called.

use super::{credentials, ApiSession, RewriteError};
use crate::cli::args::{self, PullRequestArgs};
use crate::context::Context;
use crate::core::command::Command;
use crate::core::outcome::Outcome;
use crate::core::reference::RepoRef;
use crate::core::weburl::{WebTarget, WebUrl};
use crate::forge::{ApiTarget, CreatePullRequest};

fn not_github(remote: &str) -> RewriteError {
    RewriteError::Aborted(format!(
        "Aborted: the {remote} remote doesn't point to a GitHub repository."
    ))
}

pub(super) async fn pull_request(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
) -> Result<Outcome, RewriteError> {
    if !ctx.in_repository() {
        return Err(RewriteError::NotInRepository(
            "fatal: Not a git repository".to_string(),
        ));
    }
    let args: PullRequestArgs = args::parse(command.args(), PullRequestArgs::USAGE)?;

    let origin = ctx.remote_project("origin").ok_or_else(|| not_github("origin"))?;
    let base_branch = ctx
        .remote_default_branch("origin")
        .unwrap_or_else(|| "master".to_string());
    let (mut base_repo, base_branch) = match args.base.as_deref() {
        Some(spec) => branch_spec(spec, &origin.repo),
        None => (origin.repo, base_branch),
    };

    let mut title = args.title;
    let mut issue = args.issue;
    if let Some(url) = title.as_deref().and_then(|t| WebUrl::parse(t, ctx)) {
        if let WebTarget::Issue { repo, number } = url.target {
            base_repo = repo;
            issue = Some(number);
            title = None;
        }
    }

    let creds = credentials(ctx, &base_repo.host)?;

    let tracking = match args.head {
        Some(_) => None,
        None => ctx.tracking(),
    };
    let (head_repo, head_branch) = match (args.head.as_deref(), &tracking) {
        (Some(spec), _) => branch_spec(spec, &base_repo.with_owner(&creds.login)),
        (None, Some(tracking)) => {
            let project = ctx
                .remote_project(&tracking.remote)
                .ok_or_else(|| not_github(&tracking.remote))?;
            (project.repo, tracking.branch.clone())
        }
        (None, None) => {
            let branch = ctx.current_branch().ok_or_else(|| {
                RewriteError::Aborted("Aborted: not currently on any branch.".to_string())
            })?;
            (base_repo.with_owner(&creds.login), branch)
        }
    };

    if head_repo.same_repo(&base_repo) && head_branch == base_branch {
        return Err(RewriteError::Aborted(format!(
            "Aborted: head branch is the same as base (\"{base_branch}\")\n\
             (use `-h <branch>` to specify an explicit pull request head)"
        )));
    }

    if let Some(tracking) = tracking.filter(|_| !args.force) {
        let upstream = tracking.short_ref();
        let unpushed = ctx.unpushed_commits(&upstream);
        if unpushed > 0 {
            return Err(RewriteError::Aborted(format!(
                "Aborted: {unpushed} commits are not yet pushed to {upstream}\n\
                 (use `-f` to force submit a pull request anyway)"
            )));
        }
    }

    if title.is_none() && issue.is_none() {
        return Err(RewriteError::Aborted(
            "Aborted: empty pull request title".to_string(),
        ));
    }

    let request = CreatePullRequest {
        base: base_branch,
        head: format!("{}:{}", head_repo.owner, head_branch),
        title,
        issue,
    };
    let target = ApiTarget::authenticated(base_repo.host.clone(), creds);
    let created = api
        .create_pull(&target, &base_repo, &request)
        .await
        .map_err(|e| RewriteError::api("creating pull request", e))?;

    Ok(Outcome::emit(created.html_url))
}

/// Parse `[OWNER[/REPO]:]BRANCH`; missing parts come from `repo`.
fn branch_spec(spec: &str, repo: &RepoRef) -> (RepoRef, String) {
    match spec.split_once(':') {
        Some((owner_repo, branch)) => {
            let repo = match owner_repo.split_once('/') {
                Some((owner, name)) => RepoRef::new(repo.host.clone(), owner, name),
                None => repo.with_owner(owner_repo),
            };
            (repo, branch.to_string())
        }
        None => (repo.clone(), spec.to_string()),
    }
}
