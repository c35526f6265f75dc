//! cli::exec
//!
//! Carry out an [`Outcome`]: print it, or run its steps in order.
//!
//! # Design
//!
//! Steps inherit hub's stdio. Execution stops at the first step that fails
//! and hub exits with that step's code; lines meant for after the steps are
//! printed only when every step succeeded. With `--noop` each step is
//! printed on its own line instead of being run.

use std::process::Command as Process;

use anyhow::{Context as _, Result};

use crate::core::outcome::{Outcome, Plan, Step};
use crate::ui::output;

/// Runs outcomes.
#[derive(Debug, Clone)]
pub struct Executor {
    git: String,
    noop: bool,
}

impl Executor {
    /// `git` is the program git steps run with.
    pub fn new(git: impl Into<String>, noop: bool) -> Self {
        Self {
            git: git.into(),
            noop,
        }
    }

    /// Execute and return the process exit code.
    pub fn execute(&self, outcome: &Outcome) -> Result<i32> {
        match outcome {
            Outcome::Emit { text, code } => {
                output::emit(text, *code).context("failed to write output")?;
                Ok(*code)
            }
            Outcome::Api { calls, then } => {
                for call in calls {
                    tracing::debug!(method = %call.method, host = %call.host, path = %call.path, "api call");
                }
                self.execute(then)
            }
            Outcome::Forward(plan) => self.run_plan(plan),
        }
    }

    fn run_plan(&self, plan: &Plan) -> Result<i32> {
        for warning in &plan.warnings {
            output::warn(warning);
        }
        for notice in &plan.notices {
            output::print(notice);
        }

        for step in &plan.steps {
            if self.noop {
                output::print(step.display(&self.git));
                continue;
            }
            let code = self.run_step(step)?;
            if code != 0 {
                tracing::debug!(code, step = %step.display(&self.git), "step failed");
                return Ok(code);
            }
        }

        for line in &plan.after {
            output::print(line);
        }
        Ok(0)
    }

    fn run_step(&self, step: &Step) -> Result<i32> {
        let (program, args) = match step {
            Step::Git(command) => (self.git.as_str(), command.to_argv()),
            Step::Program { program, args } => (program.as_str(), args.clone()),
        };
        tracing::debug!(program, ?args, "running");
        let status = Process::new(program)
            .args(&args)
            .status()
            .with_context(|| format!("failed to run {program}"))?;
        // Killed by a signal: no code.
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::Command;

    #[test]
    fn noop_runs_nothing() {
        let plan = Plan::single(Command::new("definitely-not-a-subcommand", ["x"]))
            .then_print("done");
        let executor = Executor::new("/nonexistent/git", true);
        assert_eq!(executor.execute(&Outcome::Forward(plan)).unwrap(), 0);
    }

    #[test]
    fn emit_returns_its_code() {
        let executor = Executor::new("git", false);
        assert_eq!(executor.execute(&Outcome::fail("")).unwrap(), 1);
        assert_eq!(executor.execute(&Outcome::emit("")).unwrap(), 0);
    }

    #[test]
    fn missing_program_is_an_error() {
        let plan = Plan {
            steps: vec![Step::Program {
                program: "/nonexistent/browser".into(),
                args: vec![],
            }],
            ..Plan::default()
        };
        let executor = Executor::new("git", false);
        assert!(executor.execute(&Outcome::Forward(plan)).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn stops_at_first_failure() {
        let plan = Plan {
            steps: vec![
                Step::Program {
                    program: "false".into(),
                    args: vec![],
                },
                Step::Program {
                    program: "/nonexistent/never-run".into(),
                    args: vec![],
                },
            ],
            ..Plan::default()
        };
        let executor = Executor::new("git", false);
        assert_eq!(executor.execute(&Outcome::Forward(plan)).unwrap(), 1);
    }
}
