//! cli::commands::error
//!
//! Failures a rule reports to the user instead of running anything.

use thiserror::Error;

use crate::forge::ApiError;

/// Where to read about configuring a GitHub user and token.
pub const CREDENTIALS_HELP: &str =
    "http://help.github.com/set-your-user-name-email-and-github-token/";

/// A rule precondition failed or an API call was rejected.
///
/// The display text is exactly what the user sees; the process exits 1.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewriteError {
    /// No login configured for the host.
    #[error("** No GitHub user set. See {}", CREDENTIALS_HELP)]
    NoUser,

    /// No token configured for the host.
    #[error("** No GitHub token set. See {}", CREDENTIALS_HELP)]
    NoToken,

    /// The command needs a repository.
    #[error("{0}")]
    NotInRepository(String),

    /// Wrong arguments; the message is a usage line.
    #[error("{0}")]
    Usage(String),

    /// An option or positional the command does not take.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A safety check stopped the command.
    #[error("{0}")]
    Aborted(String),

    /// No way to open a web browser.
    #[error("Please set $BROWSER to a web launcher to use this command.")]
    NoBrowser,

    /// The API rejected a call.
    #[error("Error {action}: {}{}", .error.message(), hint_suffix(.hint))]
    Api {
        /// What was being done, e.g. "creating repository"
        action: &'static str,
        /// The failure
        error: ApiError,
        /// Extra advice line
        hint: Option<String>,
    },
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!("\n{h}")).unwrap_or_default()
}

impl RewriteError {
    /// Wrap an API failure, adding token advice on 401.
    pub fn api(action: &'static str, error: ApiError) -> Self {
        let hint = (error.status() == Some(401))
            .then(|| "Check your token configuration (`git config github.token`)".to_string());
        RewriteError::Api {
            action,
            error,
            hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_gets_hint() {
        let err = RewriteError::api(
            "creating repository",
            ApiError::Status {
                status: 401,
                reason: "Your token is fail".into(),
                details: vec![],
            },
        );
        assert_eq!(
            err.to_string(),
            "Error creating repository: Your token is fail (HTTP 401)\n\
             Check your token configuration (`git config github.token`)"
        );
    }

    #[test]
    fn other_statuses_have_no_hint() {
        let err = RewriteError::api(
            "creating fork",
            ApiError::Status {
                status: 500,
                reason: "Your fork is fail".into(),
                details: vec![],
            },
        );
        assert_eq!(err.to_string(), "Error creating fork: Your fork is fail (HTTP 500)");
    }

    #[test]
    fn credential_messages() {
        assert_eq!(
            RewriteError::NoUser.to_string(),
            "** No GitHub user set. See http://help.github.com/set-your-user-name-email-and-github-token/"
        );
        assert!(RewriteError::NoToken.to_string().starts_with("** No GitHub token set."));
    }
}
