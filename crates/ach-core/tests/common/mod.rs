//! Shared helpers for engine integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use ach_core::{
    Achievement, AchievementInfo, EventKind, HookResult, RunResult, StoreHandle, TestCase,
    TestOutcome,
};

pub static ALWAYS_UNLOCKED: AchievementInfo = AchievementInfo {
    id: "always-unlocked",
    title: "Test Achievement",
    subtitle: "Test Subtitle",
    message: "Test Message",
};

pub static GREEN_RUN: AchievementInfo = AchievementInfo {
    id: "green-run",
    title: "Green Run",
    subtitle: "Every test passed",
    message: "Nothing to fix today.",
};

pub static RECORDER: AchievementInfo = AchievementInfo {
    id: "recorder",
    title: "Recorder",
    subtitle: "Watches everything",
    message: "Seen it all.",
};

/// Unlocks at `finalize`, whatever happened
pub struct AlwaysUnlocked;

impl Achievement for AlwaysUnlocked {
    fn info(&self) -> &'static AchievementInfo {
        &ALWAYS_UNLOCKED
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, _result: &RunResult) -> HookResult {
        store.unlock();
        Ok(())
    }
}

/// Unlocks at `finalize` when the stored run result is a success
pub struct GreenRun;

impl Achievement for GreenRun {
    fn info(&self) -> &'static AchievementInfo {
        &GREEN_RUN
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, _result: &RunResult) -> HookResult {
        if store.get_or("result.success", false) {
            store.unlock();
        }
        Ok(())
    }
}

pub type EventLog = Rc<RefCell<Vec<(&'static str, EventKind)>>>;

/// Logs every hook call; optionally unlocks itself on a given event
pub struct Recorder {
    pub info: &'static AchievementInfo,
    pub log: EventLog,
    pub unlock_on: Option<EventKind>,
}

impl Recorder {
    pub fn new(info: &'static AchievementInfo, log: &EventLog) -> Self {
        Self {
            info,
            log: Rc::clone(log),
            unlock_on: None,
        }
    }

    pub fn unlocking_on(mut self, event: EventKind) -> Self {
        self.unlock_on = Some(event);
        self
    }

    fn record(&self, store: &mut StoreHandle<'_>, event: EventKind) -> HookResult {
        self.log.borrow_mut().push((self.info.id, event));
        if self.unlock_on == Some(event) {
            store.unlock();
        }
        Ok(())
    }
}

impl Achievement for Recorder {
    fn info(&self) -> &'static AchievementInfo {
        self.info
    }

    fn begin(&mut self, store: &mut StoreHandle<'_>) -> HookResult {
        self.record(store, EventKind::Begin)
    }

    fn prepare_test(&mut self, store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        self.record(store, EventKind::PrepareTest)
    }

    fn start_test(&mut self, store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        self.record(store, EventKind::StartTest)
    }

    fn stop_test(&mut self, store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        self.record(store, EventKind::StopTest)
    }

    fn after_test(&mut self, store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        self.record(store, EventKind::AfterTest)
    }

    fn output_ready(&mut self, store: &mut StoreHandle<'_>, _out: &mut dyn Write) -> HookResult {
        self.record(store, EventKind::OutputReady)
    }

    fn report(&mut self, store: &mut StoreHandle<'_>, _out: &mut dyn Write) -> HookResult {
        self.record(store, EventKind::Report)
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, _result: &RunResult) -> HookResult {
        self.record(store, EventKind::Finalize)
    }
}

/// Output stream whose contents stay readable after the engine took it
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }

    pub fn boxed(&self) -> Box<dyn Write> {
        Box::new(self.clone())
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn suite(outcomes: &[TestOutcome]) -> Vec<TestCase> {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| TestCase::new(format!("suite::test_{i}")).with_outcome(*outcome))
        .collect()
}

pub fn passing(count: usize) -> Vec<TestCase> {
    suite(&vec![TestOutcome::Passed; count])
}
