//! cherry-pick - pick a commit from a GitHub URL or `USER@SHA`

use super::{read_protocol, replace_arg, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, Command};
use crate::core::outcome::{Outcome, Plan};
use crate::core::reference::RepoRef;
use crate::core::weburl::{parse_user_sha, WebTarget, WebUrl};

/// `git cherry-pick` options whose value is the next argument.
const CHERRY_PICK_VALUE_FLAGS: &[&str] = &["-m", "--mainline", "-X", "--strategy-option", "--strategy"];

/// Fetch the commit's repository first: from the remote that already points
/// at the owner, or from a new remote named after the owner.
pub(super) fn cherry_pick(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let args = command.args();
    let Some(&index) = positional_indices(args, CHERRY_PICK_VALUE_FLAGS).first() else {
        return Ok(Outcome::forward(command.clone()));
    };

    let Some((repo, sha)) = commit_source(ctx, &args[index]) else {
        return Ok(Outcome::forward(command.clone()));
    };

    let fetch = match ctx.remote_for_owner(&repo.owner) {
        Some(remote) => command.derive("fetch", [remote]),
        None => {
            let url = repo.clone_url(read_protocol(ctx, false, &repo.host));
            command.derive("remote", ["add", "-f", repo.owner.as_str(), url.as_str()])
        }
    };

    let pick = command.with_args(replace_arg(args, index, &[sha]));
    Ok(Outcome::Forward(Plan::single(fetch).git(pick)))
}

/// Repository and commit id named by a commit URL or `USER@SHA`.
fn commit_source(ctx: &Context, arg: &str) -> Option<(RepoRef, String)> {
    if let Some(url) = WebUrl::parse(arg, ctx) {
        return match url.target {
            WebTarget::Commit { repo, sha } => Some((repo, sha)),
            _ => None,
        };
    }
    let (owner, sha) = parse_user_sha(arg)?;
    let repo = ctx.sibling_repo(&owner, &ctx.repo_name()?);
    Some((repo, sha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeRepo;
    use crate::context::Environment;
    use crate::core::config::Settings;

    fn rewrite(args: &str) -> String {
        let ctx = Context::new(
            Box::new(FakeRepo::github()),
            Environment::in_dir("/path/to/hub"),
            Settings::default(),
        );
        let command = Command::new("cherry-pick", args.split_whitespace());
        cherry_pick(&ctx, &command)
            .map(|o| o.text("git"))
            .unwrap_or_else(|e| e.to_string())
    }

    #[test]
    fn plain_sha_is_forwarded() {
        assert_eq!(rewrite("a319d88"), "git cherry-pick a319d88");
    }

    #[test]
    fn url_of_known_owner_fetches_that_remote() {
        assert_eq!(
            rewrite("http://github.com/mislav/hub/commit/a319d88"),
            "git fetch mislav\ngit cherry-pick a319d88"
        );
        assert_eq!(
            rewrite("http://github.com/mislav/hub/commit/abcdef0123456789#comments"),
            "git fetch mislav\ngit cherry-pick abcdef0123456789"
        );
        assert_eq!(
            rewrite("https://github.com/defunkt/hub/commit/a319d88"),
            "git fetch origin\ngit cherry-pick a319d88"
        );
    }

    #[test]
    fn unknown_owner_gets_a_remote() {
        assert_eq!(
            rewrite("https://github.com/xoebus/hub/commit/a319d88"),
            "git remote add -f xoebus git://github.com/xoebus/hub.git\ngit cherry-pick a319d88"
        );
        assert_eq!(
            rewrite("xoebus@a319d88"),
            "git remote add -f xoebus git://github.com/xoebus/hub.git\ngit cherry-pick a319d88"
        );
    }

    #[test]
    fn user_notation() {
        assert_eq!(rewrite("mislav@368af20"), "git fetch mislav\ngit cherry-pick 368af20");
        assert_eq!(rewrite("mislav/hubbub@a319d88"), "git cherry-pick mislav/hubbub@a319d88");
        assert_eq!(rewrite("mislav@a319"), "git cherry-pick mislav@a319");
    }
}
