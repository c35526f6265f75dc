//! cli::commands
//!
//! The rewrite dispatcher and its rules.
//!
//! # Architecture
//!
//! Each rule:
//! 1. Inspects the command's arguments and the repository [`Context`]
//! 2. Checks its preconditions, returning a [`RewriteError`] before any side
//!    effect when one fails
//! 3. Calls the hosting API through an [`ApiSession`] if it needs to
//! 4. Returns an [`Outcome`]; nothing is executed here
//!
//! Subcommands without a rule are forwarded unchanged. When a rule decides an
//! argument is not something it understands (a full URL, a local path), it
//! forwards the command as typed rather than failing.
//!
//! # Async
//!
//! Rules that call the API are async. The dispatcher runs on a
//! current-thread runtime, so rule futures need not be `Send`.

mod browse;
mod checkout;
mod cherry_pick;
mod clone;
mod create;
pub mod error;
mod fetch;
mod fork;
mod init;
mod patch;
mod pull_request;
mod push;
mod remote;

pub use error::{RewriteError, CREDENTIALS_HELP};

use std::cell::RefCell;

use crate::context::Context;
use crate::core::command::Command;
use crate::core::outcome::{ApiCall, Outcome, Plan};
use crate::core::reference::{is_qualified, HostResolver, Protocol, RepoRef, Shorthand};
use crate::forge::{
    ApiError, ApiTarget, CreatePullRequest, CreateRepoRequest, Credentials, Endpoint,
    HostingApi, PullRequestCreated, PullRequestHead,
};

/// Version reported by `--version` and sent as the download user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Global flags that make git print something and exit.
const QUERY_FLAGS: &[&str] = &[
    "--exec-path",
    "--html-path",
    "--man-path",
    "--info-path",
    "--help",
];

/// A subcommand hub rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `clone`
    Clone,
    /// `submodule add`
    Submodule,
    /// `remote add`
    Remote,
    /// `fetch`
    Fetch,
    /// `cherry-pick`
    CherryPick,
    /// `am` and `apply`
    Patch,
    /// `init -g`
    Init,
    /// `push` to several remotes
    Push,
    /// `create`
    Create,
    /// `fork`
    Fork,
    /// `pull-request`
    PullRequest,
    /// `checkout` of a pull request URL
    Checkout,
    /// `browse`
    Browse,
    /// `compare`
    Compare,
}

impl Rule {
    /// The rule for a subcommand, if hub rewrites it.
    ///
    /// ```
    /// use hubwork::cli::commands::Rule;
    ///
    /// assert_eq!(Rule::for_subcommand("apply"), Some(Rule::Patch));
    /// assert_eq!(Rule::for_subcommand("status"), None);
    /// ```
    pub fn for_subcommand(name: &str) -> Option<Rule> {
        let rule = match name {
            "clone" => Rule::Clone,
            "submodule" => Rule::Submodule,
            "remote" => Rule::Remote,
            "fetch" => Rule::Fetch,
            "cherry-pick" => Rule::CherryPick,
            "am" | "apply" => Rule::Patch,
            "init" => Rule::Init,
            "push" => Rule::Push,
            "create" => Rule::Create,
            "fork" => Rule::Fork,
            "pull-request" => Rule::PullRequest,
            "checkout" => Rule::Checkout,
            "browse" => Rule::Browse,
            "compare" => Rule::Compare,
            _ => return None,
        };
        Some(rule)
    }

    async fn apply(
        self,
        ctx: &Context,
        api: &ApiSession<'_>,
        command: &Command,
    ) -> Result<Outcome, RewriteError> {
        match self {
            Rule::Clone => clone::clone(ctx, command),
            Rule::Submodule => clone::submodule(ctx, command),
            Rule::Remote => remote::remote(ctx, command),
            Rule::Fetch => fetch::fetch(ctx, api, command).await,
            Rule::CherryPick => cherry_pick::cherry_pick(ctx, command),
            Rule::Patch => patch::patch(ctx, command),
            Rule::Init => init::init(ctx, command),
            Rule::Push => push::push(ctx, command),
            Rule::Create => create::create(ctx, api, command).await,
            Rule::Fork => fork::fork(ctx, api, command).await,
            Rule::PullRequest => pull_request::pull_request(ctx, api, command).await,
            Rule::Checkout => checkout::checkout(ctx, api, command).await,
            Rule::Browse => browse::browse(ctx, command),
            Rule::Compare => browse::compare(ctx, command),
        }
    }
}

/// Rewrite one command.
///
/// Never fails: rule errors become an [`Outcome::Emit`] with exit code 1.
/// Any API calls made are recorded on the returned outcome.
pub async fn dispatch(ctx: &Context, api: &dyn HostingApi, command: Command) -> Outcome {
    let session = ApiSession::new(api);

    let outcome = match select(ctx, command) {
        Selected::Done(outcome) => outcome,
        Selected::Rule(rule, command) => {
            tracing::debug!(?rule, "rewriting");
            rule.apply(ctx, &session, &command)
                .await
                .unwrap_or_else(|err| Outcome::fail(err.to_string()))
        }
    };

    outcome.after_calls(session.into_calls())
}

enum Selected {
    Done(Outcome),
    Rule(Rule, Command),
}

fn select(ctx: &Context, command: Command) -> Selected {
    let Some(subcommand) = command.subcommand() else {
        return Selected::Done(without_subcommand(command));
    };

    if let Some(rule) = Rule::for_subcommand(subcommand) {
        return Selected::Rule(rule, command);
    }

    match expand_alias(ctx, &command) {
        Some((rule, expanded)) => Selected::Rule(rule, expanded),
        None => Selected::Done(Outcome::forward(command)),
    }
}

/// Only global flags: let git answer queries, otherwise show help.
fn without_subcommand(command: Command) -> Outcome {
    let query = command
        .global_flags()
        .iter()
        .any(|f| f.value.is_none() && QUERY_FLAGS.contains(&f.name.as_str()));

    if command.has_global_flag("--version") {
        Outcome::Forward(Plan::single(command).then_print(format!("hub version {VERSION}")))
    } else if query {
        Outcome::forward(command)
    } else {
        Outcome::forward(command.derive("help", Vec::<String>::new()))
    }
}

/// Expand `alias.<name>` when its first word is a subcommand with a rule.
///
/// Shell aliases (`!cmd`) and aliases of plain git commands are left to git.
fn expand_alias(ctx: &Context, command: &Command) -> Option<(Rule, Command)> {
    let name = command.subcommand()?;
    let definition = ctx.alias(name)?;
    if definition.starts_with('!') {
        return None;
    }

    let words = shell_words::split(&definition).ok()?;
    let (first, rest) = words.split_first()?;
    let rule = Rule::for_subcommand(first)?;

    tracing::debug!(alias = name, expansion = %definition, "expanding alias");
    let args = rest.iter().chain(command.args()).cloned();
    Some((rule, command.derive(first, args)))
}

// =============================================================================
// API session
// =============================================================================

/// The hosting API as seen by rules: every call is recorded.
pub struct ApiSession<'a> {
    api: &'a dyn HostingApi,
    calls: RefCell<Vec<ApiCall>>,
}

impl<'a> ApiSession<'a> {
    /// Wrap a client.
    pub fn new(api: &'a dyn HostingApi) -> Self {
        Self {
            api,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Calls made so far, in order.
    pub fn into_calls(self) -> Vec<ApiCall> {
        self.calls.into_inner()
    }

    fn record(&self, target: &ApiTarget, endpoint: Endpoint<'_>) {
        self.calls.borrow_mut().push(ApiCall {
            method: endpoint.method().to_string(),
            host: target.host.clone(),
            path: endpoint.path(),
        });
    }

    async fn repo_exists(&self, target: &ApiTarget, repo: &RepoRef) -> Result<bool, ApiError> {
        self.record(target, Endpoint::ShowRepo(repo));
        self.api.repo_exists(target, repo).await
    }

    async fn create_repo(
        &self,
        target: &ApiTarget,
        request: &CreateRepoRequest,
    ) -> Result<(), ApiError> {
        self.record(target, Endpoint::CreateRepo);
        self.api.create_repo(target, request).await
    }

    async fn fork_repo(&self, target: &ApiTarget, repo: &RepoRef) -> Result<(), ApiError> {
        self.record(target, Endpoint::ForkRepo(repo));
        self.api.fork_repo(target, repo).await
    }

    async fn create_pull(
        &self,
        target: &ApiTarget,
        base_repo: &RepoRef,
        request: &CreatePullRequest,
    ) -> Result<PullRequestCreated, ApiError> {
        self.record(target, Endpoint::CreatePull(base_repo));
        self.api.create_pull(target, base_repo, request).await
    }

    async fn pull_head(
        &self,
        target: &ApiTarget,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequestHead, ApiError> {
        self.record(target, Endpoint::ShowPull(repo, number));
        self.api.pull_head(target, repo, number).await
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// The login for `host`, or the "no user" message.
fn require_login(ctx: &Context, host: &str) -> Result<String, RewriteError> {
    ctx.login(host).ok_or(RewriteError::NoUser)
}

/// Login and token for `host`; the login is checked first.
fn credentials(ctx: &Context, host: &str) -> Result<Credentials, RewriteError> {
    let login = require_login(ctx, host)?;
    let token = ctx.token(host).ok_or(RewriteError::NoToken)?;
    Ok(Credentials { login, token })
}

/// Authenticated when credentials exist, anonymous otherwise.
fn read_target(ctx: &Context, host: &str) -> ApiTarget {
    match (ctx.login(host), ctx.token(host)) {
        (Some(login), Some(token)) => ApiTarget::authenticated(host, Credentials { login, token }),
        _ => ApiTarget::anonymous(host),
    }
}

/// Protocol for a repository the user reads from.
fn read_protocol(ctx: &Context, private: bool, host: &str) -> Protocol {
    Protocol::for_read(private, ctx.prefers_https(), host)
}

/// Clone URL for a repository argument, or `None` to leave it alone.
///
/// A bare `NAME` is one of the user's own repositories; `own_via_ssh` makes
/// those always use ssh. `HOST:OWNER/NAME` is expanded only for GitHub hosts
/// that are not ssh aliases.
fn shorthand_url(
    ctx: &Context,
    arg: &str,
    private: bool,
    own_via_ssh: bool,
) -> Result<Option<String>, RewriteError> {
    if is_qualified(arg) || ctx.is_directory(arg) {
        return Ok(None);
    }

    let url = match Shorthand::parse(arg) {
        Some(Shorthand::Name(name)) => {
            let host = ctx.default_host();
            let login = require_login(ctx, &host)?;
            let protocol = read_protocol(ctx, private || own_via_ssh, &host);
            RepoRef::new(host, login, name).clone_url(protocol)
        }
        Some(Shorthand::Owned { owner, name }) => {
            let host = ctx.default_host();
            let protocol = read_protocol(ctx, private, &host);
            RepoRef::new(host, owner, name).clone_url(protocol)
        }
        Some(Shorthand::Hosted { host, owner, name })
            if ctx.is_github_host(&host) && !ctx.is_ssh_alias(&host) =>
        {
            let protocol = read_protocol(ctx, private, &host);
            RepoRef::new(host, owner, name).clone_url(protocol)
        }
        _ => return Ok(None),
    };

    Ok(Some(url))
}

/// Replace the argument at `index`.
fn replace_arg(args: &[String], index: usize, with: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + with.len());
    out.extend_from_slice(&args[..index]);
    out.extend_from_slice(with);
    out.extend_from_slice(&args[index + 1..]);
    out
}
