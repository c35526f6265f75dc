//! push - push to several remotes at once with `REMOTE1,REMOTE2`

use super::{replace_arg, RewriteError};
use crate::context::Context;
use crate::core::command::{positional_indices, Command};
use crate::core::outcome::{Outcome, Plan};

/// `git push` options whose value is the next argument.
const PUSH_VALUE_FLAGS: &[&str] = &["--repo", "--receive-pack", "--exec", "-o", "--push-option"];

/// One `git push` per remote; the refspecs default to the current branch.
pub(super) fn push(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let args = command.args();
    let positions = positional_indices(args, PUSH_VALUE_FLAGS);
    let Some(&first) = positions.first().filter(|&&i| args[i].contains(',')) else {
        return Ok(Outcome::forward(command.clone()));
    };

    let mut base = args.to_vec();
    if positions.len() == 1 {
        let branch = ctx.current_branch().ok_or_else(|| {
            RewriteError::Aborted("Aborted: not currently on any branch.".to_string())
        })?;
        base.push(branch);
    }

    let plan = args[first]
        .split(',')
        .filter(|remote| !remote.is_empty())
        .fold(Plan::default(), |plan, remote| {
            plan.git(command.with_args(replace_arg(&base, first, &[remote.to_string()])))
        });

    Ok(Outcome::Forward(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeRepo;
    use crate::context::Environment;
    use crate::core::config::Settings;

    fn rewrite(repo: FakeRepo, args: &str) -> String {
        let ctx = Context::new(
            Box::new(repo),
            Environment::in_dir("/path/to/hub"),
            Settings::default(),
        );
        let command = Command::new("push", args.split_whitespace());
        push(&ctx, &command)
            .map(|o| o.text("git"))
            .unwrap_or_else(|e| e.to_string())
    }

    #[test]
    fn single_remote_is_forwarded() {
        assert_eq!(rewrite(FakeRepo::github(), ""), "git push");
        assert_eq!(rewrite(FakeRepo::github(), "origin master"), "git push origin master");
    }

    #[test]
    fn one_push_per_remote() {
        assert_eq!(
            rewrite(FakeRepo::github(), "origin,staging,qa cool-feature"),
            "git push origin cool-feature\n\
             git push staging cool-feature\n\
             git push qa cool-feature"
        );
    }

    #[test]
    fn branch_defaults_to_current() {
        assert_eq!(
            rewrite(FakeRepo::github().with_head("cool-feature"), "-f origin,staging"),
            "git push -f origin cool-feature\ngit push -f staging cool-feature"
        );
    }

    #[test]
    fn detached_head_aborts() {
        assert_eq!(
            rewrite(FakeRepo::github().detached(), "origin,staging"),
            "Aborted: not currently on any branch."
        );
    }
}
