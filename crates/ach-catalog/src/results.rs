//! Achievements about how a run turned out
//!
//! `result.success` from the previous run is still in the store when a run
//! begins; the engine overwrites it at finalize, so rules comparing runs read
//! it in `begin`.

use ach_core::engine::RESULT_SUCCESS;
use ach_core::{Achievement, AchievementInfo, HookResult, RunResult, StoreHandle};

/// Running total of tests over all runs
pub const TESTS_TOTAL: &str = "tests.total";

pub static HAPPY_ENDING: AchievementInfo = AchievementInfo {
    id: "happy-ending",
    title: "Happy Ending",
    subtitle: "All tests passed after a failing run",
    message: "Whatever you did, it worked.",
};

pub static MINOR_LETDOWN: AchievementInfo = AchievementInfo {
    id: "minor-letdown",
    title: "Minor Letdown",
    subtitle: "One test broke after a passing run",
    message: "So close.",
};

pub static COMPLETE_FAILURE: AchievementInfo = AchievementInfo {
    id: "complete-failure",
    title: "Complete Failure",
    subtitle: "Not a single test passed",
    message: "At least you are consistent.",
};

pub static MARATHON: AchievementInfo = AchievementInfo {
    id: "marathon",
    title: "Marathon",
    subtitle: "Ran a thousand tests over time",
    message: "Keep running.",
};

/// Previous run failed, this one passes
#[derive(Debug, Default)]
pub struct HappyEnding {
    previous_success: Option<bool>,
}

impl Achievement for HappyEnding {
    fn info(&self) -> &'static AchievementInfo {
        &HAPPY_ENDING
    }

    fn begin(&mut self, store: &mut StoreHandle<'_>) -> HookResult {
        self.previous_success = store.get(RESULT_SUCCESS);
        Ok(())
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        if self.previous_success == Some(false) && result.tests_run > 0 && result.was_successful() {
            store.unlock();
        }
        Ok(())
    }
}

/// Previous run passed, this one has exactly one bad test
#[derive(Debug, Default)]
pub struct MinorLetdown {
    previous_success: Option<bool>,
}

impl Achievement for MinorLetdown {
    fn info(&self) -> &'static AchievementInfo {
        &MINOR_LETDOWN
    }

    fn begin(&mut self, store: &mut StoreHandle<'_>) -> HookResult {
        self.previous_success = store.get(RESULT_SUCCESS);
        Ok(())
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        let bad = result.failures.saturating_add(result.errors);
        if self.previous_success == Some(true) && bad == 1 {
            store.unlock();
        }
        Ok(())
    }
}

/// A run of at least `min_tests` tests where nothing passed
#[derive(Debug)]
pub struct CompleteFailure {
    min_tests: u64,
}

impl CompleteFailure {
    pub fn new(min_tests: u64) -> Self {
        Self { min_tests }
    }
}

impl Default for CompleteFailure {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Achievement for CompleteFailure {
    fn info(&self) -> &'static AchievementInfo {
        &COMPLETE_FAILURE
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        if result.tests_run >= self.min_tests && result.passed() == 0 {
            store.unlock();
        }
        Ok(())
    }
}

/// Accumulates `tests.total` across runs
#[derive(Debug)]
pub struct Marathon {
    goal: u64,
}

impl Marathon {
    pub fn new(goal: u64) -> Self {
        Self { goal }
    }
}

impl Default for Marathon {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Achievement for Marathon {
    fn info(&self) -> &'static AchievementInfo {
        &MARATHON
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        let total = store.get_or(TESTS_TOTAL, 0u64).saturating_add(result.tests_run);
        store.set(TESTS_TOTAL, total)?;
        if total >= self.goal {
            store.unlock();
        }
        Ok(())
    }
}
