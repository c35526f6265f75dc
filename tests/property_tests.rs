//! Property-based tests for command parsing and rewriting.
//!
//! These tests use proptest to check invariants over generated command lines
//! and repository names.

use proptest::prelude::*;

use hubwork::cli::commands::{dispatch, Rule};
use hubwork::context::fake::FakeRepo;
use hubwork::context::{Context, Environment};
use hubwork::core::command::Command;
use hubwork::core::config::Settings;
use hubwork::core::reference::{parse_remote_url, HostResolver, Protocol, RepoRef, DEFAULT_HOST};
use hubwork::forge::mock::MockHostingApi;

/// Strategy for owner names GitHub accepts.
fn owner() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,15}"
}

/// Strategy for repository names (never ending in `.git` or `.`).
fn repo_name() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_-]{0,15}"
}

/// Strategy for global flag groups that parse back to themselves.
fn global_flag() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        Just(vec!["-p".to_string()]),
        Just(vec!["--bare".to_string()]),
        Just(vec!["--no-pager".to_string()]),
        "[a-z]{1,8}\\.[a-z]{1,8}=[a-z]{1,8}".prop_map(|kv| vec!["-c".to_string(), kv]),
        "[a-z]{1,8}".prop_map(|dir| vec!["-C".to_string(), dir]),
        "[a-z]{1,8}".prop_map(|dir| vec![format!("--git-dir={dir}")]),
    ]
}

/// Strategy for subcommand arguments, including ones that look like flags.
fn argument() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9/._:-]{1,20}",
        "-[a-z]",
        "--[a-z]{2,10}",
        "[a-z]{1,5} [a-z]{1,5}",
    ]
}

struct GitHubHosts;

impl HostResolver for GitHubHosts {
    fn resolve_alias(&self, host: &str) -> String {
        host.to_string()
    }

    fn is_github_host(&self, host: &str) -> bool {
        host == DEFAULT_HOST
    }
}

fn rewrite(argv: &[String]) -> String {
    let ctx = Context::new(
        Box::new(FakeRepo::github()),
        Environment::in_dir("/path/to/hub"),
        Settings::default(),
    );
    let api = MockHostingApi::new();
    let command = Command::parse(argv.iter().cloned()).command;
    tokio_test::block_on(dispatch(&ctx, &api, command)).text("git")
}

proptest! {
    /// Parsing splits a command line without losing or reordering anything.
    #[test]
    fn parse_preserves_argv(
        globals in prop::collection::vec(global_flag(), 0..4),
        sub in "[a-z][a-z-]{0,10}",
        args in prop::collection::vec(argument(), 0..6),
    ) {
        let mut argv: Vec<String> = globals.into_iter().flatten().collect();
        argv.push(sub.clone());
        argv.extend(args.iter().cloned());

        let invocation = Command::parse(argv.iter().cloned());
        prop_assert!(!invocation.noop);
        prop_assert_eq!(invocation.command.subcommand(), Some(sub.as_str()));
        prop_assert_eq!(invocation.command.args(), args.as_slice());
        prop_assert_eq!(invocation.command.to_argv(), argv);
    }

    /// `--noop` anywhere before the subcommand is consumed and nothing else.
    #[test]
    fn noop_is_removed(
        before in prop::collection::vec(global_flag(), 0..3),
        after in prop::collection::vec(global_flag(), 0..3),
    ) {
        let mut argv: Vec<String> = before.iter().flatten().cloned().collect();
        argv.push("--noop".to_string());
        argv.extend(after.iter().flatten().cloned());
        argv.push("status".to_string());

        let invocation = Command::parse(argv.iter().cloned());
        prop_assert!(invocation.noop);
        let expected: Vec<String> = argv.into_iter().filter(|a| a != "--noop").collect();
        prop_assert_eq!(invocation.command.to_argv(), expected);
    }

    /// Subcommands hub has no rule for reach git exactly as typed.
    #[test]
    fn unmapped_commands_pass_through(
        sub in "[a-z]{2,10}",
        args in prop::collection::vec("[a-zA-Z0-9/._:-]{1,20}", 0..5),
    ) {
        prop_assume!(Rule::for_subcommand(&sub).is_none());
        let mut argv = vec![sub];
        argv.extend(args);

        let expected = std::iter::once("git".to_string())
            .chain(argv.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(rewrite(&argv), expected);
    }

    /// `clone OWNER/NAME` always becomes a read-only github.com URL.
    #[test]
    fn clone_owner_name(owner in owner(), name in repo_name()) {
        let argv = vec!["clone".to_string(), format!("{owner}/{name}")];
        prop_assert_eq!(
            rewrite(&argv),
            format!("git clone git://github.com/{owner}/{name}.git")
        );
    }

    /// URLs and paths are never rewritten by clone.
    #[test]
    fn clone_leaves_qualified_arguments(
        prefix in prop_oneof![Just("./"), Just("/"), Just("https://"), Just("git@")],
        rest in "[a-z/]{1,20}",
    ) {
        let arg = format!("{prefix}{rest}");
        let argv = vec!["clone".to_string(), arg.clone()];
        prop_assert_eq!(rewrite(&argv), format!("git clone {arg}"));
    }

    /// Every clone URL hub writes parses back to the same repository.
    #[test]
    fn clone_urls_parse_back(
        owner in owner(),
        name in repo_name(),
        protocol in prop_oneof![Just(Protocol::Git), Just(Protocol::Ssh), Just(Protocol::Https)],
    ) {
        let repo = RepoRef::new(DEFAULT_HOST, owner, name);
        let project = parse_remote_url(&repo.clone_url(protocol), &GitHubHosts);
        prop_assert_eq!(project.map(|p| p.repo), Some(repo));
    }
}
