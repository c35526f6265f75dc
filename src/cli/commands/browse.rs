//! browse, compare - open repository pages in a web browser
//!
//! # Design
//!
//! Both commands build a URL under the project's web page and then either
//! print it (`-u`) or run a browser on it. The browser is, in order:
//! `$BROWSER`, `browser.command` from the settings file, then the platform
//! launcher (`open`, `xdg-open`, ...) found on `PATH`.

use super::{require_login, RewriteError};
use crate::context::Context;
use crate::core::command::{take_flag, Command};
use crate::core::outcome::{Outcome, Plan, Step};
use crate::core::reference::{Project, RepoRef};

const BROWSE_USAGE: &str = "Usage: hub browse [<USER>/]<REPOSITORY>";
const COMPARE_USAGE: &str = "Usage: hub compare [USER] [<START>...]<END>";

/// `browse [-u] [[OWNER/]REPO|--] [SUBPAGE]`
pub(super) fn browse(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let mut args = command.args().to_vec();
    let print_only = take_flag(&mut args, "-u");
    let mut warnings = Vec::new();
    if take_flag(&mut args, "-p") {
        warnings.push("Warning: the `-p` flag has no effect anymore".to_string());
    }

    let (explicit, subpage) = match args.split_first() {
        Some((first, rest)) if first == "--" => (None, rest.first().cloned()),
        Some((first, rest)) => (Some(first.as_str()), rest.first().cloned()),
        None => (None, None),
    };

    let (project, branch, current) = match explicit {
        Some(arg) => (named_project(ctx, arg)?, Some("master".to_string()), false),
        None => {
            let project = ctx
                .current_project()
                .ok_or_else(|| RewriteError::Usage(BROWSE_USAGE.to_string()))?;
            (project, ctx.tracking().map(|t| t.branch), true)
        }
    };

    let path = if project.wiki {
        Some(match subpage.as_deref() {
            None | Some("wiki") => "wiki".to_string(),
            Some("commits") => "wiki/_history".to_string(),
            Some("pages") => "wiki/_pages".to_string(),
            Some(page) => format!("wiki/{page}"),
        })
    } else {
        let branch = branch.as_deref();
        match subpage.as_deref() {
            Some("commits") => Some(format!("commits/{}", branch.unwrap_or("master"))),
            Some("tree") => Some(format!("tree/{}", branch.unwrap_or("master"))),
            Some(page) => Some(page.to_string()),
            None => branch
                .filter(|b| current && *b != "master")
                .map(|b| format!("tree/{b}")),
        }
    };

    let url = page_url(&project.repo, path.as_deref());
    present(ctx, url, print_only, warnings)
}

/// `compare [-u] [USER] [[START...]END]`
pub(super) fn compare(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let mut args = command.args().to_vec();
    let print_only = take_flag(&mut args, "-u");

    let (user, range) = match args.as_slice() {
        [] => (None, None),
        [range] => (None, Some(range.clone())),
        [user, range] => (Some(user.as_str()), Some(range.clone())),
        _ => return Err(RewriteError::Usage(COMPARE_USAGE.to_string())),
    };

    let range = match range {
        Some(range) => range,
        None => ctx
            .tracking()
            .map(|t| t.branch)
            .filter(|b| b != "master")
            .ok_or_else(|| RewriteError::Usage(COMPARE_USAGE.to_string()))?,
    };
    let range = three_dot_range(&range);

    let project = ctx
        .current_project()
        .ok_or_else(|| RewriteError::Usage(COMPARE_USAGE.to_string()))?;
    let repo = match user {
        Some(user) => project.repo.with_owner(user),
        None => project.repo.clone(),
    };

    let path = if project.wiki {
        format!("wiki/_compare/{range}")
    } else {
        format!("compare/{range}")
    };
    present(ctx, page_url(&repo, Some(path.as_str())), print_only, Vec::new())
}

/// `A..B` becomes `A...B`; ranges with other dots are left alone.
fn three_dot_range(range: &str) -> String {
    if range.contains("...") {
        return range.to_string();
    }
    match range.split("..").collect::<Vec<_>>().as_slice() {
        [start, end] => format!("{start}...{end}"),
        _ => range.to_string(),
    }
}

/// `[OWNER/]NAME[.wiki]`; a bare name belongs to the user.
fn named_project(ctx: &Context, arg: &str) -> Result<Project, RewriteError> {
    let host = ctx.default_host();
    let (owner, name) = match arg.split_once('/') {
        Some((owner, name)) => (owner.to_string(), name),
        None => (require_login(ctx, &host)?, arg),
    };
    let (name, wiki) = match name.strip_suffix(".wiki") {
        Some(name) => (name, true),
        None => (name, false),
    };
    Ok(Project {
        repo: RepoRef::new(host, owner, name),
        wiki,
    })
}

fn page_url(repo: &RepoRef, path: Option<&str>) -> String {
    match path {
        Some(path) => format!("{}/{}", repo.web_url(), path),
        None => repo.web_url(),
    }
}

fn present(
    ctx: &Context,
    url: String,
    print_only: bool,
    warnings: Vec<String>,
) -> Result<Outcome, RewriteError> {
    if print_only {
        return Ok(Outcome::Forward(Plan {
            warnings,
            after: vec![url],
            ..Plan::default()
        }));
    }

    let (program, mut args) = launcher(ctx, &url).ok_or(RewriteError::NoBrowser)?;
    args.push(url);
    Ok(Outcome::Forward(Plan {
        warnings,
        steps: vec![Step::Program { program, args }],
        ..Plan::default()
    }))
}

/// Browser program and its leading arguments.
fn launcher(ctx: &Context, url: &str) -> Option<(String, Vec<String>)> {
    let configured = ctx
        .env()
        .browser
        .clone()
        .or_else(|| ctx.settings().browser.command.clone());
    if let Some(line) = configured {
        let mut words = shell_words::split(&line).ok()?.into_iter();
        let program = words.next()?;
        return Some((program, words.collect()));
    }

    open::commands(url).into_iter().find_map(|cmd| {
        let program = cmd.get_program().to_string_lossy().into_owned();
        which::which(&program).ok()?;
        // The platform command already ends with the URL.
        let mut args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        if args.last().map(String::as_str) == Some(url) {
            args.pop();
        }
        tracing::debug!(%program, "using platform launcher");
        Some((program, args))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeRepo;
    use crate::context::Environment;
    use crate::core::config::Settings;

    fn context(repo: FakeRepo) -> Context {
        let mut env = Environment::in_dir("/path/to/hub");
        env.browser = Some("open".to_string());
        Context::new(Box::new(repo), env, Settings::default())
    }

    type RuleFn = fn(&Context, &Command) -> Result<Outcome, RewriteError>;

    fn run(rule: RuleFn, repo: FakeRepo, name: &str, args: &[&str]) -> String {
        let ctx = context(repo);
        let command = Command::new(name, args.iter().copied());
        rule(&ctx, &command)
            .map(|o| o.text("git"))
            .unwrap_or_else(|e| e.to_string())
    }

    fn feature_branch() -> FakeRepo {
        FakeRepo::github()
            .with_head("feature")
            .with_upstream("feature", "refs/remotes/mislav/experimental")
    }

    mod browse {
        use super::*;

        fn rewrite(repo: FakeRepo, args: &[&str]) -> String {
            run(super::super::browse, repo, "browse", args)
        }

        #[test]
        fn explicit_repository() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert"]),
                "open https://github.com/mojombo/bert"
            );
            assert_eq!(
                rewrite(FakeRepo::github(), &["bert"]),
                "open https://github.com/tpw/bert"
            );
        }

        #[test]
        fn print_only() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["-u", "mojombo/bert"]),
                "https://github.com/mojombo/bert"
            );
        }

        #[test]
        fn subpages() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert", "commits"]),
                "open https://github.com/mojombo/bert/commits/master"
            );
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert", "issues"]),
                "open https://github.com/mojombo/bert/issues"
            );
        }

        #[test]
        fn wiki_pages() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert.wiki"]),
                "open https://github.com/mojombo/bert/wiki"
            );
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert.wiki", "commits"]),
                "open https://github.com/mojombo/bert/wiki/_history"
            );
            assert_eq!(
                rewrite(FakeRepo::github(), &["mojombo/bert.wiki", "pages"]),
                "open https://github.com/mojombo/bert/wiki/_pages"
            );
        }

        #[test]
        fn current_repository() {
            assert_eq!(
                rewrite(FakeRepo::github(), &[]),
                "open https://github.com/defunkt/hub"
            );
        }

        #[test]
        fn tracked_feature_branch() {
            assert_eq!(
                rewrite(feature_branch(), &[]),
                "open https://github.com/mislav/hub/tree/experimental"
            );
            assert_eq!(
                rewrite(feature_branch(), &["--", "commits"]),
                "open https://github.com/mislav/hub/commits/experimental"
            );
        }

        #[test]
        fn ssh_alias_remote() {
            let repo = FakeRepo::github()
                .with_remote("origin", &["gh:singingwolfboy/sekrit.git"])
                .with_ssh_alias("gh", "github.com");
            assert_eq!(
                rewrite(repo, &[]),
                "open https://github.com/singingwolfboy/sekrit"
            );
        }

        #[test]
        fn dash_p_is_ignored_with_warning() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["-p", "defunkt/hub"]),
                "Warning: the `-p` flag has no effect anymore\nopen https://github.com/defunkt/hub"
            );
        }

        #[test]
        fn no_project_prints_usage() {
            assert_eq!(
                rewrite(FakeRepo::github().without_remotes(), &[]),
                BROWSE_USAGE
            );
        }
    }

    mod compare {
        use super::*;

        fn rewrite(repo: FakeRepo, args: &[&str]) -> String {
            run(super::super::compare, repo, "compare", args)
        }

        #[test]
        fn single_ref() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["refactor"]),
                "open https://github.com/defunkt/hub/compare/refactor"
            );
        }

        #[test]
        fn two_dot_range_becomes_three() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["1.0..fix"]),
                "open https://github.com/defunkt/hub/compare/1.0...fix"
            );
            assert_eq!(
                rewrite(FakeRepo::github(), &["1.0...fix"]),
                "open https://github.com/defunkt/hub/compare/1.0...fix"
            );
            assert_eq!(three_dot_range("@{a..b}..@{c..d}"), "@{a..b}..@{c..d}");
        }

        #[test]
        fn fork_owner() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["myfork", "feature"]),
                "open https://github.com/myfork/hub/compare/feature"
            );
        }

        #[test]
        fn tracked_branch_by_default() {
            assert_eq!(
                rewrite(feature_branch(), &[]),
                "open https://github.com/mislav/hub/compare/experimental"
            );
        }

        #[test]
        fn extra_arguments_print_usage() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["myfork", "1.0...fix", "extra"]),
                COMPARE_USAGE
            );
        }

        #[test]
        fn master_needs_a_range() {
            assert_eq!(rewrite(FakeRepo::github(), &[]), COMPARE_USAGE);
        }

        #[test]
        fn print_only() {
            assert_eq!(
                rewrite(FakeRepo::github(), &["-u", "refactor"]),
                "https://github.com/defunkt/hub/compare/refactor"
            );
        }
    }
}
