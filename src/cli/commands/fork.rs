//! fork - fork the current project and add the fork as a remote

use super::{credentials, ApiSession, RewriteError};
use crate::cli::args::{self, ForkArgs};
use crate::context::Context;
use crate::core::command::Command;
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::Protocol;
use crate::forge::ApiTarget;

/// `fork [--no-remote]`: refuses when the user's fork already exists.
pub(super) async fn fork(
    ctx: &Context,
    api: &ApiSession<'_>,
    command: &Command,
) -> Result<Outcome, RewriteError> {
    if !ctx.in_repository() {
        return Err(RewriteError::NotInRepository(
            "fatal: Not a git repository".to_string(),
        ));
    }
    let project = ctx.main_project().ok_or_else(|| {
        RewriteError::Aborted(
            "Aborted: the origin remote doesn't point to a GitHub repository.".to_string(),
        )
    })?;
    let args: ForkArgs = args::parse(command.args(), ForkArgs::USAGE)?;

    let upstream = project.repo;
    let creds = credentials(ctx, &upstream.host)?;
    let login = creds.login.clone();
    let fork = upstream.with_owner(&login);
    let target = ApiTarget::authenticated(upstream.host.clone(), creds);

    let exists = api
        .repo_exists(&target, &fork)
        .await
        .map_err(|e| RewriteError::api("creating fork", e))?;
    if exists {
        return Err(RewriteError::Aborted(format!(
            "Error creating fork: {} already exists on {}",
            fork.full_name(),
            fork.host
        )));
    }

    api.fork_repo(&target, &upstream)
        .await
        .map_err(|e| RewriteError::api("creating fork", e))?;

    if args.no_remote {
        return Ok(Outcome::Forward(Plan::default()));
    }

    let url = fork.clone_url(Protocol::for_write(ctx.prefers_https()));
    let remote = command.derive("remote", ["add", "-f", login.as_str(), url.as_str()]);
    Ok(Outcome::Forward(
        Plan::single(remote).then_print(format!("new remote: {login}")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeRepo;
    use crate::context::Environment;
    use crate::core::config::Settings;
    use crate::core::reference::RepoRef;
    use crate::forge::mock::{FailOn, MockHostingApi, MockOperation};
    use crate::forge::ApiError;

    fn rewrite(repo: FakeRepo, api: &MockHostingApi, args: &str) -> String {
        let ctx = Context::new(
            Box::new(repo),
            Environment::in_dir("/path/to/hub"),
            Settings::default(),
        );
        let session = ApiSession::new(api);
        let command = Command::new("fork", args.split_whitespace());
        tokio_test::block_on(fork(&ctx, &session, &command))
            .map(|o| o.text("git"))
            .unwrap_or_else(|e| e.to_string())
    }

    #[test]
    fn forks_and_adds_remote() {
        let api = MockHostingApi::new();
        assert_eq!(
            rewrite(FakeRepo::github(), &api, ""),
            "git remote add -f tpw git@github.com:tpw/hub.git\nnew remote: tpw"
        );
        assert!(api.operations().contains(&MockOperation::ForkRepo {
            repo: RepoRef::new("github.com", "defunkt", "hub"),
            login: Some("tpw".into()),
        }));
    }

    #[test]
    fn https_preference() {
        let api = MockHostingApi::new();
        assert_eq!(
            rewrite(FakeRepo::github().with_config("hub.protocol", "https"), &api, ""),
            "git remote add -f tpw https://github.com/tpw/hub.git\nnew remote: tpw"
        );
    }

    #[test]
    fn no_remote_prints_nothing() {
        let api = MockHostingApi::new();
        assert_eq!(rewrite(FakeRepo::github(), &api, "--no-remote"), "");
        assert!(api.has_repo(&RepoRef::new("github.com", "tpw", "hub")));
    }

    #[test]
    fn existing_fork_aborts() {
        let api = MockHostingApi::new().with_repo("github.com", "tpw", "hub");
        assert_eq!(
            rewrite(FakeRepo::github(), &api, ""),
            "Error creating fork: tpw/hub already exists on github.com"
        );
    }

    #[test]
    fn api_failure_is_reported() {
        let api = MockHostingApi::new().fail_on(FailOn::ForkRepo(ApiError::Status {
            status: 500,
            reason: "Your fork is fail".into(),
            details: vec![],
        }));
        assert_eq!(
            rewrite(FakeRepo::github(), &api, ""),
            "Error creating fork: Your fork is fail (HTTP 500)"
        );
    }

    #[test]
    fn outside_repository() {
        let api = MockHostingApi::new();
        assert_eq!(
            rewrite(FakeRepo::github().outside_repository(), &api, ""),
            "fatal: Not a git repository"
        );
    }

    #[test]
    fn enterprise_credentials() {
        let api = MockHostingApi::new();
        let repo = FakeRepo::github()
            .without_remotes()
            .with_remote("origin", &["git@git.my.org:defunkt/hub.git"])
            .with_config_all("hub.host", &["git.my.org"])
            .with_config("github.git.my.org.user", "myfiname")
            .with_config("github.git.my.org.token", "789xyz");
        assert_eq!(
            rewrite(repo, &api, ""),
            "git remote add -f myfiname git@git.my.org:myfiname/hub.git\nnew remote: myfiname"
        );
    }
}
