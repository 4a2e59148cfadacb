//! Simulated host runner
//!
//! Drives an engine through the same event order a real test runner uses,
//! with outcomes decided up front. Used by the CLI and by tests.

use std::io::{self, Write};

use crate::engine::{Engine, EngineError};
use crate::event::{RunResult, TestCase};
use crate::report::RunSummary;

/// Run `tests` through every lifecycle event and finalize the engine
///
/// Each test is prepared and started without an outcome; its planned outcome
/// (passed when unset) is visible from `stop_test` on. The simulated host has
/// no report section of its own, so `report` output is discarded.
pub fn run_suite(
    engine: &mut Engine,
    tests: impl IntoIterator<Item = TestCase>,
    output: Box<dyn Write>,
) -> Result<RunSummary, EngineError> {
    engine.begin()?;

    let mut finished = Vec::new();
    for planned in tests {
        let mut test = TestCase::new(planned.name);
        engine.prepare_test(&test)?;
        engine.start_test(&test)?;
        test.outcome = Some(planned.outcome.unwrap_or_default());
        engine.stop_test(&test)?;
        engine.after_test(&test)?;
        finished.push(test);
    }

    engine.set_output_stream(output)?;
    engine.report(&mut io::sink())?;
    engine.finalize(&RunResult::from_tests(&finished))
}
