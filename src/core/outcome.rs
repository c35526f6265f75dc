//! core::outcome
//!
//! What a rewrite produces: commands to run, text to print, or a record of
//! the API calls made on the way to one of those.
//!
//! # Design
//!
//! Rules never execute anything. They return an [`Outcome`], and the executor
//! in `cli::exec` decides whether to run the steps or (under `--noop`) print
//! them. This keeps every rewrite testable by comparing command lines.

use super::command::{display_line, Command};

/// One command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A git invocation (the git program is resolved by the executor)
    Git(Command),
    /// Any other program, e.g. `curl` or the web browser
    Program {
        /// Program name or path
        program: String,
        /// Arguments, unquoted
        args: Vec<String>,
    },
}

impl Step {
    /// Render for display; `git` is the program name used for git steps.
    pub fn display(&self, git: &str) -> String {
        match self {
            Step::Git(command) => command.display(git),
            Step::Program { program, args } => display_line(program, args),
        }
    }
}

/// An ordered list of steps plus the messages that surround them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    /// Printed to stdout before any step runs
    pub notices: Vec<String>,
    /// Printed to stderr before any step runs
    pub warnings: Vec<String>,
    /// Executed in order; the first failure stops the plan
    pub steps: Vec<Step>,
    /// Printed to stdout once every step succeeded
    pub after: Vec<String>,
}

impl Plan {
    /// A plan with a single git step.
    pub fn single(command: Command) -> Self {
        Self {
            steps: vec![Step::Git(command)],
            ..Self::default()
        }
    }

    /// Append a git step.
    pub fn git(mut self, command: Command) -> Self {
        self.steps.push(Step::Git(command));
        self
    }

    /// Append a message to print after the steps.
    pub fn then_print(mut self, line: impl Into<String>) -> Self {
        self.after.push(line.into());
        self
    }
}

/// An API call made while computing an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    /// HTTP method
    pub method: String,
    /// API host
    pub host: String,
    /// Endpoint path below the API root
    pub path: String,
}

/// The result of rewriting a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Run (or print) these steps
    Forward(Plan),
    /// Print text and exit with `code`; non-zero codes print to stderr
    Emit {
        /// Text to print (may span several lines)
        text: String,
        /// Process exit code
        code: i32,
    },
    /// API calls were made; `then` is what to do next
    Api {
        /// Calls in the order they were made
        calls: Vec<ApiCall>,
        /// The outcome once the calls completed
        then: Box<Outcome>,
    },
}

impl Outcome {
    /// Forward a single command.
    pub fn forward(command: Command) -> Self {
        Outcome::Forward(Plan::single(command))
    }

    /// Print text and exit successfully.
    pub fn emit(text: impl Into<String>) -> Self {
        Outcome::Emit {
            text: text.into(),
            code: 0,
        }
    }

    /// Print text to stderr and exit with status 1.
    pub fn fail(text: impl Into<String>) -> Self {
        Outcome::Emit {
            text: text.into(),
            code: 1,
        }
    }

    /// Wrap in an API record unless no calls were made.
    pub fn after_calls(self, calls: Vec<ApiCall>) -> Self {
        if calls.is_empty() {
            self
        } else {
            Outcome::Api {
                calls,
                then: Box::new(self),
            }
        }
    }

    /// The outcome with API records peeled off.
    pub fn settled(&self) -> &Outcome {
        match self {
            Outcome::Api { then, .. } => then.settled(),
            other => other,
        }
    }

    /// Every API call recorded in this outcome.
    pub fn api_calls(&self) -> Vec<&ApiCall> {
        match self {
            Outcome::Api { calls, then } => calls.iter().chain(then.api_calls()).collect(),
            _ => Vec::new(),
        }
    }

    /// The exit code this outcome produces without running anything.
    pub fn code(&self) -> i32 {
        match self.settled() {
            Outcome::Emit { code, .. } => *code,
            _ => 0,
        }
    }

    /// Everything this outcome would print under `--noop`, one entry per line.
    ///
    /// ```
    /// use hubwork::core::command::Command;
    /// use hubwork::core::outcome::Outcome;
    ///
    /// let outcome = Outcome::forward(Command::new("status", ["-s"]));
    /// assert_eq!(outcome.lines("git"), ["git status -s"]);
    /// ```
    pub fn lines(&self, git: &str) -> Vec<String> {
        match self.settled() {
            Outcome::Forward(plan) => plan
                .warnings
                .iter()
                .chain(plan.notices.iter())
                .cloned()
                .chain(plan.steps.iter().map(|s| s.display(git)))
                .chain(plan.after.iter().cloned())
                .collect(),
            Outcome::Emit { text, .. } if text.is_empty() => Vec::new(),
            Outcome::Emit { text, .. } => text.lines().map(str::to_string).collect(),
            Outcome::Api { .. } => Vec::new(),
        }
    }

    /// [`lines`](Self::lines) joined with newlines.
    pub fn text(&self, git: &str) -> String {
        self.lines(git).join("\n")
    }
}
