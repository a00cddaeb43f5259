//! The validation runner.
//!
//! Checks are registered in order and numbered from 1; `run` executes each
//! body exactly once in that order against a shared context and streams the
//! report as it goes. A failing check is reported and the run continues.
//! A panicking check is caught, reported as crashed, and the run continues.

use crate::error::CheckResult;
use crate::report::TapWriter;
use serde::Serialize;
use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

type CheckBody<C> = Box<dyn Fn(&mut C) -> CheckResult>;

/// A registered check: sequence number, description, and deferred body.
pub struct Check<C> {
    pub id: usize,
    pub description: String,
    body: CheckBody<C>,
}

/// How one check ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(String),
    /// The body panicked; a defect in the check, not a violated expectation.
    Crashed(String),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// The diagnostic message written under a `not ok` line.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(message) => Some(message.clone()),
            Outcome::Crashed(message) => Some(format!("check crashed: {message}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub id: usize,
    pub description: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Everything a run produced, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<CheckOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|row| row.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn crashed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|row| matches!(row.outcome, Outcome::Crashed(_)))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

pub struct Runner<C> {
    checks: Vec<Check<C>>,
}

impl<C> Default for Runner<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<C> Runner<C> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check and return its id. Nothing runs here.
    pub fn register<F>(&mut self, description: impl Into<String>, body: F) -> usize
    where
        F: Fn(&mut C) -> CheckResult + 'static,
    {
        let id = self.checks.len() + 1;
        self.checks.push(Check {
            id,
            description: description.into(),
            body: Box::new(body),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn checks(&self) -> impl Iterator<Item = &Check<C>> {
        self.checks.iter()
    }

    fn invoke(check: &Check<C>, ctx: &mut C) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| (check.body)(ctx)));
        match result {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(failure)) => Outcome::Failed(failure.message),
            Err(payload) => Outcome::Crashed(panic_message(payload.as_ref())),
        }
    }

    /// Run every check in order, streaming TAP to `out`.
    pub fn run<W: Write>(&self, ctx: &mut C, out: &mut W) -> io::Result<RunSummary> {
        let mut tap = TapWriter::new(out);
        tap.plan(self.checks.len())?;
        let summary = self.run_with(ctx, |row| tap.result(row))?;
        tap.flush()?;
        Ok(summary)
    }

    /// Run every check in order without writing anything.
    pub fn run_silent(&self, ctx: &mut C) -> RunSummary {
        self.run_with(ctx, |_| Ok(())).unwrap_or_default()
    }

    fn run_with<F>(&self, ctx: &mut C, mut sink: F) -> io::Result<RunSummary>
    where
        F: FnMut(&CheckOutcome) -> io::Result<()>,
    {
        let mut summary = RunSummary::default();
        for check in &self.checks {
            log::debug!("check {} start: {}", check.id, check.description);
            let outcome = Self::invoke(check, ctx);
            match &outcome {
                Outcome::Passed => log::debug!("check {} passed", check.id),
                Outcome::Failed(message) => log::debug!("check {} failed: {message}", check.id),
                Outcome::Crashed(message) => log::warn!("check {} crashed: {message}", check.id),
            }
            let row = CheckOutcome {
                id: check.id,
                description: check.description.clone(),
                outcome,
            };
            sink(&row)?;
            summary.outcomes.push(row);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckFailure;

    fn render(runner: &Runner<Vec<usize>>, ctx: &mut Vec<usize>) -> String {
        let mut out = Vec::new();
        runner.run(ctx, &mut out).expect("in-memory write");
        String::from_utf8(out).expect("utf8 report")
    }

    #[test]
    fn registration_numbers_from_one_and_defers_execution() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        assert_eq!(runner.register("a", |_| panic!("must not run yet")), 1);
        assert_eq!(runner.register("b", |_| Ok(())), 2);
        assert_eq!(runner.len(), 2);
        let ids: Vec<usize> = runner.checks().map(|check| check.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn failure_is_isolated_from_later_checks() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        runner.register("A", |_| Err(CheckFailure::new("A broke")));
        runner.register("B", |seen| {
            seen.push(2);
            Ok(())
        });

        let mut seen = Vec::new();
        let report = render(&runner, &mut seen);
        assert_eq!(seen, vec![2]);
        assert_eq!(
            report,
            "TAP version 14\n1..2\nnot ok 1 - A\n  ---\n  message: \"A broke\"\n  ...\nok 2 - B\n"
        );
    }

    #[test]
    fn later_checks_see_state_from_earlier_ones() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        runner.register("load", |state| {
            state.push(7);
            Ok(())
        });
        runner.register("read", |state| {
            if state.first() == Some(&7) {
                Ok(())
            } else {
                Err(CheckFailure::new("not loaded"))
            }
        });
        let summary = runner.run_silent(&mut Vec::new());
        assert!(summary.is_success());
        assert_eq!(summary.passed(), 2);
    }

    #[test]
    fn panics_are_reported_as_crashes() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        runner.register("boom", |_| panic!("index out of range"));
        runner.register("after", |_| Ok(()));

        let summary = runner.run_silent(&mut Vec::new());
        assert_eq!(
            summary.outcomes[0].outcome,
            Outcome::Crashed("index out of range".to_string())
        );
        assert_eq!(
            summary.outcomes[0].outcome.message().as_deref(),
            Some("check crashed: index out of range")
        );
        assert_eq!(summary.outcomes[1].outcome, Outcome::Passed);
        assert_eq!(summary.crashed(), 1);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn empty_message_still_reports() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        runner.register("quiet", |_| Err(CheckFailure::new("")));
        let report = render(&runner, &mut Vec::new());
        assert!(report.contains("not ok 1 - quiet\n  ---\n  message: \"\"\n  ...\n"));
    }

    #[test]
    fn plan_counts_every_check_and_runs_are_identical() {
        let mut runner: Runner<Vec<usize>> = Runner::new();
        for idx in 0..5 {
            runner.register(format!("check {idx}"), move |_| {
                if idx % 2 == 0 {
                    Ok(())
                } else {
                    Err(CheckFailure::new(format!("odd {idx}")))
                }
            });
        }
        let first = render(&runner, &mut Vec::new());
        let second = render(&runner, &mut Vec::new());
        assert_eq!(first, second);
        assert_eq!(first.lines().nth(1), Some("1..5"));

        let ids: Vec<usize> = first
            .lines()
            .filter_map(|line| {
                line.strip_prefix("ok ")
                    .or_else(|| line.strip_prefix("not ok "))
                    .and_then(|rest| rest.split(' ').next())
                    .and_then(|id| id.parse().ok())
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
