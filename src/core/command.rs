//! core::command
//!
//! The command model: git-level global flags, the subcommand, and its
//! arguments.
//!
//! # Design
//!
//! Parsing only separates what git itself treats as global options from the
//! rest; subcommand arguments stay as plain strings and are classified per
//! rule with [`classify`], because only the rule knows which of its flags take
//! a value. Quoting is applied exclusively by [`display_arg`] when a command is
//! printed; argv handed to a process is never quoted.
//!
//! # Example
//!
//! ```
//! use hubwork::core::command::Command;
//!
//! let invocation = Command::parse(["--noop", "-c", "a.b=1", "clone", "x/y"]);
//! assert!(invocation.noop);
//! assert_eq!(invocation.command.subcommand(), Some("clone"));
//! assert_eq!(invocation.command.to_argv(), ["-c", "a.b=1", "clone", "x/y"]);
//! ```

use std::borrow::Cow;

/// The hub-only global flag that prints commands instead of running them.
pub const NOOP_FLAG: &str = "--noop";

/// Global options whose value is always the following argument.
const SEPARATE_VALUE_FLAGS: &[&str] = &["-c", "-C"];

/// Global options that take a value either attached (`--opt=v`) or separate.
const LONG_VALUE_FLAGS: &[&str] = &["--git-dir", "--work-tree", "--namespace", "--config-env"];

/// A git global option, e.g. `--bare`, `-c key=value` or `--git-dir=/srv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFlag {
    /// Flag name including dashes
    pub name: String,
    /// Value, if the flag carries one
    pub value: Option<String>,
    /// Whether the value was written as `--name=value`
    pub attached: bool,
}

impl GlobalFlag {
    /// A flag without a value.
    pub fn switch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            attached: false,
        }
    }

    /// A flag whose value is the next argument.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            attached: false,
        }
    }

    /// Render the flag back into argv form.
    pub fn to_args(&self) -> Vec<String> {
        match (&self.value, self.attached) {
            (Some(value), true) => vec![format!("{}={}", self.name, value)],
            (Some(value), false) => vec![self.name.clone(), value.clone()],
            (None, _) => vec![self.name.clone()],
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    global_flags: Vec<GlobalFlag>,
    subcommand: Option<String>,
    args: Vec<String>,
}

/// The result of parsing argv: the command plus hub's own switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `--noop` was given: print commands instead of running them
    pub noop: bool,
    /// The command with hub-only flags removed
    pub command: Command,
}

impl Command {
    /// Build a command with no global flags.
    pub fn new<I, S>(subcommand: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            global_flags: Vec::new(),
            subcommand: Some(subcommand.to_string()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split raw argv into global flags, subcommand and arguments.
    pub fn parse<I, S>(argv: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = argv.into_iter().map(Into::into);
        let mut noop = false;
        let mut global_flags = Vec::new();
        let mut subcommand = None;

        while let Some(token) = tokens.next() {
            if token == NOOP_FLAG {
                noop = true;
                continue;
            }
            if !token.starts_with('-') {
                subcommand = Some(token);
                break;
            }
            if SEPARATE_VALUE_FLAGS.contains(&token.as_str()) {
                let flag = match tokens.next() {
                    Some(value) => GlobalFlag::with_value(token, value),
                    None => GlobalFlag::switch(token),
                };
                global_flags.push(flag);
                continue;
            }
            if let Some((name, value)) = token.split_once('=') {
                global_flags.push(GlobalFlag {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                    attached: true,
                });
                continue;
            }
            if LONG_VALUE_FLAGS.contains(&token.as_str()) {
                let flag = match tokens.next() {
                    Some(value) => GlobalFlag::with_value(token, value),
                    None => GlobalFlag::switch(token),
                };
                global_flags.push(flag);
                continue;
            }
            global_flags.push(GlobalFlag::switch(token));
        }

        Invocation {
            noop,
            command: Command {
                global_flags,
                subcommand,
                args: tokens.collect(),
            },
        }
    }

    /// The subcommand, if one was given.
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommand.as_deref()
    }

    /// Arguments following the subcommand.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Global flags in their original order.
    pub fn global_flags(&self) -> &[GlobalFlag] {
        &self.global_flags
    }

    /// Whether a value-less global flag such as `--version` is present.
    pub fn has_global_flag(&self, name: &str) -> bool {
        self.global_flags.iter().any(|f| f.name == name)
    }

    /// A sibling command: same global flags, different subcommand and args.
    pub fn derive<I, S>(&self, subcommand: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command {
            global_flags: self.global_flags.clone(),
            subcommand: Some(subcommand.to_string()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The same command with its arguments replaced.
    pub fn with_args<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command {
            global_flags: self.global_flags.clone(),
            subcommand: self.subcommand.clone(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a global flag after the existing ones.
    pub fn push_global_flag(&mut self, flag: GlobalFlag) {
        self.global_flags.push(flag);
    }

    /// The argv to hand to git (without the program name).
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv: Vec<String> = self.global_flags.iter().flat_map(|f| f.to_args()).collect();
        if let Some(ref sub) = self.subcommand {
            argv.push(sub.clone());
        }
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Render for display, e.g. `git clone '--template=white space' url`.
    pub fn display(&self, program: &str) -> String {
        display_line(program, &self.to_argv())
    }
}

/// Quote an argument for display if it contains whitespace.
///
/// ```
/// use hubwork::core::command::display_arg;
///
/// assert_eq!(display_arg("plain"), "plain");
/// assert_eq!(display_arg("white space"), "'white space'");
/// ```
pub fn display_arg(arg: &str) -> Cow<'_, str> {
    if arg.chars().any(char::is_whitespace) {
        shell_words::quote(arg)
    } else {
        Cow::Borrowed(arg)
    }
}

/// Render a program and its argv as one display line.
pub fn display_line(program: &str, args: &[String]) -> String {
    std::iter::once(Cow::Borrowed(program))
        .chain(args.iter().map(|a| display_arg(a)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a subcommand argument was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// An option such as `--bare` or `--depth=1`
    Flag,
    /// The value of the preceding option (`-o master`)
    FlagValue,
    /// The `--` separator
    Separator,
    /// Anything else
    Positional,
}

/// Classify subcommand arguments given the options that take a separate value.
///
/// Everything after `--` is positional.
pub fn classify(args: &[String], value_flags: &[&str]) -> Vec<ArgKind> {
    let mut kinds = Vec::with_capacity(args.len());
    let mut expect_value = false;
    let mut after_separator = false;

    for arg in args {
        let kind = if expect_value {
            expect_value = false;
            ArgKind::FlagValue
        } else if after_separator {
            ArgKind::Positional
        } else if arg == "--" {
            after_separator = true;
            ArgKind::Separator
        } else if arg.starts_with('-') && arg.len() > 1 {
            expect_value = value_flags.contains(&arg.as_str());
            ArgKind::Flag
        } else {
            ArgKind::Positional
        };
        kinds.push(kind);
    }

    kinds
}

/// Indices of positional arguments.
pub fn positional_indices(args: &[String], value_flags: &[&str]) -> Vec<usize> {
    classify(args, value_flags)
        .into_iter()
        .enumerate()
        .filter(|(_, kind)| *kind == ArgKind::Positional)
        .map(|(i, _)| i)
        .collect()
}

/// Remove every occurrence of `flag`, returning whether it was present.
pub fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != flag);
    args.len() != before
}
