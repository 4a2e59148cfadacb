//! Lifecycle events surfaced by the host test runner
//!
//! The vocabulary is fixed: one run produces `begin`, then for every test
//! `prepare_test`, `start_test`, `stop_test`, `after_test`, then
//! `output_ready`, `report` and finally `finalize`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Kind of lifecycle event, used for logging and state checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Run is about to start
    Begin,

    /// A test is about to be prepared
    PrepareTest,

    /// A test starts running
    StartTest,

    /// A test stopped running
    StopTest,

    /// A test and its teardown are done
    AfterTest,

    /// The host handed over the output stream
    OutputReady,

    /// The host is writing its report
    Report,

    /// Run is over, results are final
    Finalize,
}

/// Outcome of a single test
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    #[default]
    Passed,
    Failed,
    Errored,
    Skipped,
}

/// A test under observation
///
/// The outcome is unknown until the test stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Fully qualified test name (e.g. `crate::module::test_name`)
    pub name: String,
    /// Outcome once the test has run
    pub outcome: Option<TestOutcome>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: TestOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// Aggregate result of a whole run, handed to `finalize`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Number of tests that ran (skips excluded)
    pub tests_run: u64,
    /// Tests whose assertions failed
    pub failures: u64,
    /// Tests that raised an unexpected error
    pub errors: u64,
}

impl RunResult {
    /// Tally outcomes of finished tests; tests without an outcome are ignored
    pub fn from_tests<'a>(tests: impl IntoIterator<Item = &'a TestCase>) -> Self {
        let mut result = Self::default();
        for outcome in tests.into_iter().filter_map(|t| t.outcome) {
            match outcome {
                TestOutcome::Passed => result.tests_run += 1,
                TestOutcome::Failed => {
                    result.tests_run += 1;
                    result.failures += 1;
                }
                TestOutcome::Errored => {
                    result.tests_run += 1;
                    result.errors += 1;
                }
                TestOutcome::Skipped => {}
            }
        }
        result
    }

    /// True when no test failed or errored (an empty run is successful)
    pub const fn was_successful(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    pub const fn passed(&self) -> u64 {
        self.tests_run
            .saturating_sub(self.failures)
            .saturating_sub(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_event_names_are_snake_case() {
        let names: Vec<String> = EventKind::iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            [
                "begin",
                "prepare_test",
                "start_test",
                "stop_test",
                "after_test",
                "output_ready",
                "report",
                "finalize"
            ]
        );
    }

    #[test]
    fn test_run_result_tally() {
        let tests = [
            TestCase::new("a").with_outcome(TestOutcome::Passed),
            TestCase::new("b").with_outcome(TestOutcome::Failed),
            TestCase::new("c").with_outcome(TestOutcome::Errored),
            TestCase::new("d").with_outcome(TestOutcome::Skipped),
            TestCase::new("e"),
        ];
        let result = RunResult::from_tests(&tests);
        assert_eq!(result.tests_run, 3);
        assert_eq!(result.failures, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(result.passed(), 1);
        assert!(!result.was_successful());
    }

    #[test]
    fn test_empty_run_is_successful() {
        assert!(RunResult::default().was_successful());
    }
}
