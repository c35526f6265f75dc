//! cli::args
//!
//! Argument grammars for the commands hub implements itself.
//!
//! # Design
//!
//! Rewritten git commands keep their arguments as plain strings, since git
//! owns their grammar. Commands that exist only in hub (`create`, `fork`,
//! `pull-request`) have a fixed grammar, declared here with clap derive and
//! parsed from the arguments after the subcommand. Clap's own help and
//! version flags are disabled: `-h` means "homepage" or "head" in these
//! commands.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;

use crate::cli::commands::RewriteError;

/// `create [NAME|OWNER/NAME] [-p] [-d DESCRIPTION] [-h HOMEPAGE]`
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "create",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct CreateArgs {
    /// Create a private repository
    #[arg(short = 'p')]
    pub private: bool,

    /// Repository description
    #[arg(short = 'd', value_name = "DESCRIPTION")]
    pub description: Option<String>,

    /// Repository homepage
    #[arg(short = 'h', value_name = "HOMEPAGE")]
    pub homepage: Option<String>,

    /// Repository name, optionally prefixed by an organization
    pub name: Option<String>,
}

impl CreateArgs {
    /// One-line usage.
    pub const USAGE: &'static str = "Usage: hub create [NAME] [-p] [-d DESCRIPTION] [-h HOMEPAGE]";
}

/// `fork [--no-remote]`
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "fork",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ForkArgs {
    /// Fork without adding a remote
    #[arg(long = "no-remote")]
    pub no_remote: bool,
}

impl ForkArgs {
    /// One-line usage.
    pub const USAGE: &'static str = "Usage: hub fork [--no-remote]";
}

/// `pull-request [-f] [TITLE|-i ISSUE|ISSUE-URL] [-b BASE] [-h HEAD]`
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "pull-request",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PullRequestArgs {
    /// Skip the unpushed commits check
    #[arg(short = 'f')]
    pub force: bool,

    /// Turn an existing issue into a pull request
    #[arg(short = 'i', value_name = "ISSUE")]
    pub issue: Option<u64>,

    /// Base: `[OWNER[/REPO]:]BRANCH`
    #[arg(short = 'b', value_name = "BASE")]
    pub base: Option<String>,

    /// Head: `[OWNER[/REPO]:]BRANCH`
    #[arg(short = 'h', value_name = "HEAD")]
    pub head: Option<String>,

    /// Title, or the URL of an issue to attach to
    pub title: Option<String>,
}

impl PullRequestArgs {
    /// One-line usage.
    pub const USAGE: &'static str =
        "Usage: hub pull-request [-f] [TITLE|-i ISSUE] [-b BASE] [-h HEAD]";
}

/// Parse a hub-only command's arguments.
///
/// Unknown options and surplus positionals become `invalid argument: ARG`;
/// anything else wrong prints `usage`.
///
/// ```
/// use hubwork::cli::args::{parse, CreateArgs};
///
/// let args: CreateArgs = parse(&["-p".to_string(), "acme/widget".to_string()], CreateArgs::USAGE).unwrap();
/// assert!(args.private);
/// assert_eq!(args.name.as_deref(), Some("acme/widget"));
/// ```
pub fn parse<T: Parser>(args: &[String], usage: &str) -> Result<T, RewriteError> {
    T::try_parse_from(args).map_err(|err| {
        let invalid = match (err.kind(), err.get(ContextKind::InvalidArg)) {
            (ErrorKind::UnknownArgument, Some(ContextValue::String(arg))) => Some(arg.clone()),
            _ => None,
        };
        tracing::debug!(kind = ?err.kind(), "argument error");
        match invalid {
            Some(arg) => RewriteError::InvalidArgument(arg),
            None => RewriteError::Usage(usage.to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    mod create {
        use super::*;

        #[test]
        fn all_options() {
            let args: CreateArgs = parse(
                &strings(&["-d", "toyproject", "-h", "http://example.com", "-p"]),
                CreateArgs::USAGE,
            )
            .unwrap();
            assert_eq!(
                args,
                CreateArgs {
                    private: true,
                    description: Some("toyproject".into()),
                    homepage: Some("http://example.com".into()),
                    name: None,
                }
            );
        }

        #[test]
        fn unknown_option_is_invalid() {
            let err = parse::<CreateArgs>(&strings(&["-a", "blah"]), CreateArgs::USAGE).unwrap_err();
            assert_eq!(err.to_string(), "invalid argument: -a");
        }

        #[test]
        fn extra_positional_is_invalid() {
            let err =
                parse::<CreateArgs>(&strings(&["blah", "bleh"]), CreateArgs::USAGE).unwrap_err();
            assert_eq!(err.to_string(), "invalid argument: bleh");
        }

        #[test]
        fn missing_value_prints_usage() {
            let err = parse::<CreateArgs>(&strings(&["-d"]), CreateArgs::USAGE).unwrap_err();
            assert_eq!(err, RewriteError::Usage(CreateArgs::USAGE.to_string()));
        }
    }

    mod pull_request {
        use super::*;

        #[test]
        fn options_after_title() {
            let args: PullRequestArgs = parse(
                &strings(&["hereyougo", "-h", "mojombo:feature", "-f"]),
                PullRequestArgs::USAGE,
            )
            .unwrap();
            assert!(args.force);
            assert_eq!(args.title.as_deref(), Some("hereyougo"));
            assert_eq!(args.head.as_deref(), Some("mojombo:feature"));
        }

        #[test]
        fn issue_must_be_a_number() {
            let err = parse::<PullRequestArgs>(&strings(&["-i", "abc"]), PullRequestArgs::USAGE)
                .unwrap_err();
            assert_eq!(err, RewriteError::Usage(PullRequestArgs::USAGE.to_string()));
        }
    }

    #[test]
    fn fork_no_remote() {
        let args: ForkArgs = parse(&strings(&["--no-remote"]), ForkArgs::USAGE).unwrap();
        assert!(args.no_remote);
    }
}
