//! Achievements about when and how long tests ran
//!
//! All of them read the `time.start` / `time.finish` facts the engine records
//! during the run, so they decide at finalize.

use ach_core::engine::{TIME_FINISH, TIME_START};
use ach_core::{Achievement, AchievementInfo, HookResult, RunResult, StoreHandle};
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};

pub static NIGHT_SHIFT: AchievementInfo = AchievementInfo {
    id: "night-shift",
    title: "Night Shift",
    subtitle: "Ran tests between midnight and 5am",
    message: "Go to bed.",
};

pub static INSTANT_FEEDBACK: AchievementInfo = AchievementInfo {
    id: "instant-feedback",
    title: "Instant Feedback",
    subtitle: "Fifty tests in under a second",
    message: "Blink and you miss it.",
};

pub static COFFEE_BREAK: AchievementInfo = AchievementInfo {
    id: "coffee-break",
    title: "Coffee Break",
    subtitle: "A test run took five minutes",
    message: "Was the coffee good?",
};

fn recorded_time(store: &StoreHandle<'_>, key: &str) -> Option<DateTime<FixedOffset>> {
    store.get(key)
}

fn run_duration(store: &StoreHandle<'_>) -> Option<TimeDelta> {
    let start = recorded_time(store, TIME_START)?;
    let finish = recorded_time(store, TIME_FINISH)?;
    Some(finish.signed_duration_since(start))
}

/// Run started in the small hours, local time of the machine running it
#[derive(Debug)]
pub struct NightShift {
    /// Hours `[from, until)` that count as night
    from: u32,
    until: u32,
}

impl NightShift {
    pub fn new(from: u32, until: u32) -> Self {
        Self { from, until }
    }
}

impl Default for NightShift {
    fn default() -> Self {
        Self::new(0, 5)
    }
}

impl Achievement for NightShift {
    fn info(&self) -> &'static AchievementInfo {
        &NIGHT_SHIFT
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, _result: &RunResult) -> HookResult {
        if let Some(start) = recorded_time(store, TIME_START)
            && (self.from..self.until).contains(&start.hour())
        {
            store.unlock();
        }
        Ok(())
    }
}

/// Many tests, very little wall time
#[derive(Debug)]
pub struct InstantFeedback {
    min_tests: u64,
    limit: TimeDelta,
}

impl InstantFeedback {
    pub fn new(min_tests: u64, limit: TimeDelta) -> Self {
        Self { min_tests, limit }
    }
}

impl Default for InstantFeedback {
    fn default() -> Self {
        Self::new(50, TimeDelta::seconds(1))
    }
}

impl Achievement for InstantFeedback {
    fn info(&self) -> &'static AchievementInfo {
        &INSTANT_FEEDBACK
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        if result.tests_run < self.min_tests {
            return Ok(());
        }
        if run_duration(store).is_some_and(|d| d < self.limit) {
            store.unlock();
        }
        Ok(())
    }
}

/// A run long enough to make coffee
#[derive(Debug)]
pub struct CoffeeBreak {
    threshold: TimeDelta,
}

impl CoffeeBreak {
    pub fn new(threshold: TimeDelta) -> Self {
        Self { threshold }
    }
}

impl Default for CoffeeBreak {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(5))
    }
}

impl Achievement for CoffeeBreak {
    fn info(&self) -> &'static AchievementInfo {
        &COFFEE_BREAK
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        if result.tests_run > 0 && run_duration(store).is_some_and(|d| d >= self.threshold) {
            store.unlock();
        }
        Ok(())
    }
}
