//! am and apply - download pull request, commit and gist patches first

use super::{replace_arg, RewriteError, VERSION};
use crate::context::Context;
use crate::core::command::{positional_indices, Command};
use crate::core::outcome::{Outcome, Plan, Step};
use crate::core::weburl::{WebTarget, WebUrl};

/// `git am` / `git apply` options whose value is the next argument.
const PATCH_VALUE_FLAGS: &[&str] = &["--directory", "--exclude", "--include", "-C", "--patch-format"];

/// The first URL argument naming a patch is downloaded with curl into the
/// temp directory and replaced by the downloaded file.
pub(super) fn patch(ctx: &Context, command: &Command) -> Result<Outcome, RewriteError> {
    let args = command.args();
    let found = positional_indices(args, PATCH_VALUE_FLAGS)
        .into_iter()
        .find_map(|i| download(ctx, &args[i]).map(|d| (i, d)));

    let Some((index, (url, file))) = found else {
        return Ok(Outcome::forward(command.clone()));
    };

    let path = ctx.env().tmp_dir().join(file).to_string_lossy().into_owned();
    let curl = Step::Program {
        program: "curl".to_string(),
        args: vec![
            "-#LA".to_string(),
            format!("hub {VERSION}"),
            url,
            "-o".to_string(),
            path.clone(),
        ],
    };

    let mut plan = Plan::default();
    plan.steps.push(curl);
    Ok(Outcome::Forward(
        plan.git(command.with_args(replace_arg(args, index, &[path]))),
    ))
}

/// Download URL and file name for a patch URL.
fn download(ctx: &Context, arg: &str) -> Option<(String, String)> {
    let url = WebUrl::parse(arg, ctx)?;
    match url.target {
        WebTarget::Pull { repo, number } => Some((
            format!(
                "{}://{}/{}/{}/pull/{}.patch",
                url.scheme, url.host, repo.owner, repo.name, number
            ),
            format!("{number}.patch"),
        )),
        WebTarget::Commit { sha, .. } => Some((format!("{}.patch", url.base), format!("{sha}.patch"))),
        WebTarget::Gist { id } => Some((format!("{}.txt", url.base), format!("gist-{id}.txt"))),
        WebTarget::Issue { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeRepo;
    use crate::context::Environment;
    use crate::core::config::Settings;

    fn rewrite(tmpdir: Option<&str>, sub: &str, args: &str) -> Vec<String> {
        let mut env = Environment::in_dir("/path/to/hub");
        env.tmpdir = tmpdir.map(str::to_string);
        let ctx = Context::new(Box::new(FakeRepo::github()), env, Settings::default());
        let command = Command::new(sub, args.split_whitespace());
        patch(&ctx, &command)
            .map(|o| o.lines("git"))
            .unwrap_or_else(|e| vec![e.to_string()])
    }

    #[test]
    fn local_patches_are_forwarded() {
        assert_eq!(rewrite(None, "am", "some.patch"), vec!["git am some.patch"]);
        assert_eq!(rewrite(None, "apply", "some.patch"), vec!["git apply some.patch"]);
    }

    #[test]
    fn pull_request_patch() {
        assert_eq!(
            rewrite(
                Some("/tmp/"),
                "am",
                "--signoff https://github.com/defunkt/hub/pull/55#comment_123 -p2"
            ),
            vec![
                format!("curl -#LA 'hub {VERSION}' https://github.com/defunkt/hub/pull/55.patch -o /tmp/55.patch"),
                "git am --signoff /tmp/55.patch -p2".to_string(),
            ]
        );
    }

    #[test]
    fn files_tab_downloads_the_same_patch() {
        let lines = rewrite(None, "apply", "https://github.com/defunkt/hub/pull/55/files");
        assert!(lines[0].contains("/pull/55.patch -o /tmp/55.patch"), "{lines:?}");
    }

    #[test]
    fn commit_and_gist() {
        let commit = "https://github.com/davidbalbert/hub/commit/fdb9921";
        assert_eq!(
            rewrite(Some("/tmp/"), "apply", &format!("{commit} -p2")),
            vec![
                format!("curl -#LA 'hub {VERSION}' {commit}.patch -o /tmp/fdb9921.patch"),
                "git apply /tmp/fdb9921.patch -p2".to_string(),
            ]
        );

        let gist = "https://gist.github.com/8da7fb575debd88c54cf";
        assert_eq!(
            rewrite(Some("/tmp/"), "am", &format!("--signoff {gist} -p2")),
            vec![
                format!("curl -#LA 'hub {VERSION}' {gist}.txt -o /tmp/gist-8da7fb575debd88c54cf.txt"),
                "git am --signoff /tmp/gist-8da7fb575debd88c54cf.txt -p2".to_string(),
            ]
        );
    }
}
