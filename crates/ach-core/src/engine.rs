//! Dispatch engine
//!
//! Receives lifecycle events from the host runner one at a time and fans them
//! out to every registered achievement that is still locked, in registration
//! order. A failing or panicking hook is logged and recorded but never stops
//! dispatch to the other achievements.
//!
//! The engine moves through `Uninitialized -> Active -> Finalized`; events
//! that do not fit the current state are rejected.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use chrono::Local;
use strum::Display;
use thiserror::Error;
use tracing::{debug, warn};

use crate::achievement::{Achievement, AchievementId, HookResult, Registry};
use crate::config::EngineConfig;
use crate::event::{EventKind, RunResult, TestCase};
use crate::persist;
use crate::report::{RunSummary, render_banner, write_banners};
use crate::store::{StoreError, StoreHandle, UnlockStore};

/// First test preparation of the run
pub const TIME_START: &str = "time.start";
/// Moment the host handed over its output stream
pub const TIME_FINISH: &str = "time.finish";
pub const RESULT_ERRORS: &str = "result.errors";
pub const RESULT_FAILURES: &str = "result.failures";
pub const RESULT_TESTS: &str = "result.tests";
pub const RESULT_SUCCESS: &str = "result.success";

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Active,
    Finalized,
}

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot handle {event} event while {state}")]
    InvalidState { event: EventKind, state: EngineState },

    #[error("failed to record run facts: {0}")]
    Store(#[from] StoreError),

    #[error("failed to save achievement data: {0}")]
    Save(#[source] StoreError),

    #[error("failed to write unlock banners: {0}")]
    Output(#[from] io::Error),
}

/// A hook that returned an error or panicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub achievement: AchievementId,
    pub event: EventKind,
    pub message: String,
}

/// Feeds one test run's lifecycle events to achievements
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
    achievements: Vec<Box<dyn Achievement>>,
    provided_store: Option<UnlockStore>,
    store: UnlockStore,
    state: EngineState,
    output: Option<Box<dyn Write>>,
    failures: Vec<HookFailure>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            achievements: Vec::new(),
            provided_store: None,
            store: UnlockStore::new(),
            state: EngineState::Uninitialized,
            output: None,
            failures: Vec::new(),
        }
    }

    /// Kinds instantiated at `begin` when discovery is enabled
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Use this store instead of loading one at `begin`
    pub fn with_store(mut self, store: UnlockStore) -> Self {
        self.provided_store = Some(store);
        self
    }

    pub fn with_achievement(mut self, achievement: impl Achievement + 'static) -> Self {
        self.register(Box::new(achievement));
        self
    }

    /// Add an achievement; dispatch follows registration order
    pub fn register(&mut self, achievement: Box<dyn Achievement>) {
        if self.state != EngineState::Uninitialized {
            warn!(
                "ignoring late registration of {} while {}",
                achievement.id(),
                self.state
            );
            return;
        }
        self.achievements.push(achievement);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn store(&self) -> &UnlockStore {
        &self.store
    }

    pub fn into_store(self) -> UnlockStore {
        self.store
    }

    pub fn achievement_ids(&self) -> Vec<AchievementId> {
        self.achievements.iter().map(|a| a.id()).collect()
    }

    pub fn hook_failures(&self) -> &[HookFailure] {
        &self.failures
    }

    /// Start the run: load the store, discover achievements, dispatch `begin`
    pub fn begin(&mut self) -> Result<(), EngineError> {
        self.expect_state(EventKind::Begin, EngineState::Uninitialized)?;

        self.store = match (self.provided_store.take(), &self.config.storage_path) {
            (Some(store), _) => {
                debug!("starting with provided achievement data");
                store
            }
            (None, Some(path)) => persist::load_or_default(path),
            (None, None) => {
                debug!("starting with new in-memory achievement data");
                UnlockStore::new()
            }
        };
        self.store.start_run();
        self.store.remove(TIME_START);
        self.store.remove(TIME_FINISH);

        if self.config.discovery_enabled {
            for entry in self.registry.entries() {
                let id = entry.info.achievement_id();
                if self.store.is_unlocked(&id) || self.achievements.iter().any(|a| a.id() == id) {
                    continue;
                }
                self.achievements.push((entry.build)());
            }
        }
        debug!("tracking {} achievements", self.achievements.len());

        self.state = EngineState::Active;
        self.dispatch(EventKind::Begin, |a, s| a.begin(s));
        Ok(())
    }

    pub fn prepare_test(&mut self, test: &TestCase) -> Result<(), EngineError> {
        self.expect_state(EventKind::PrepareTest, EngineState::Active)?;
        self.store.set_if_absent(TIME_START, Local::now())?;
        self.dispatch(EventKind::PrepareTest, |a, s| a.prepare_test(s, test));
        Ok(())
    }

    pub fn start_test(&mut self, test: &TestCase) -> Result<(), EngineError> {
        self.expect_state(EventKind::StartTest, EngineState::Active)?;
        self.dispatch(EventKind::StartTest, |a, s| a.start_test(s, test));
        Ok(())
    }

    pub fn stop_test(&mut self, test: &TestCase) -> Result<(), EngineError> {
        self.expect_state(EventKind::StopTest, EngineState::Active)?;
        self.dispatch(EventKind::StopTest, |a, s| a.stop_test(s, test));
        Ok(())
    }

    pub fn after_test(&mut self, test: &TestCase) -> Result<(), EngineError> {
        self.expect_state(EventKind::AfterTest, EngineState::Active)?;
        self.dispatch(EventKind::AfterTest, |a, s| a.after_test(s, test));
        Ok(())
    }

    /// Take the stream unlock banners are written to
    pub fn set_output_stream(&mut self, mut out: Box<dyn Write>) -> Result<(), EngineError> {
        self.expect_state(EventKind::OutputReady, EngineState::Active)?;
        self.store.set_if_absent(TIME_FINISH, Local::now())?;
        self.dispatch(EventKind::OutputReady, |a, s| a.output_ready(s, &mut *out));
        self.output = Some(out);
        Ok(())
    }

    pub fn report(&mut self, out: &mut dyn Write) -> Result<(), EngineError> {
        self.expect_state(EventKind::Report, EngineState::Active)?;
        self.dispatch(EventKind::Report, |a, s| a.report(s, &mut *out));
        Ok(())
    }

    /// End the run: record results, dispatch `finalize`, save, print banners
    pub fn finalize(&mut self, result: &RunResult) -> Result<RunSummary, EngineError> {
        self.expect_state(EventKind::Finalize, EngineState::Active)?;

        self.store.set(RESULT_ERRORS, result.errors)?;
        self.store.set(RESULT_FAILURES, result.failures)?;
        self.store.set(RESULT_TESTS, result.tests_run)?;
        self.store.set(RESULT_SUCCESS, result.was_successful())?;

        self.dispatch(EventKind::Finalize, |a, s| a.finalize(s, result));
        self.state = EngineState::Finalized;

        if let Some(path) = &self.config.storage_path {
            persist::save_to_path(&self.store, path).map_err(EngineError::Save)?;
        }

        let summary = self.summarize();
        if !summary.banners.is_empty() {
            match self.output.as_mut() {
                Some(out) => write_banners(&mut **out, &summary.banners)?,
                None => write_banners(&mut io::stdout().lock(), &summary.banners)?,
            }
        }
        Ok(summary)
    }

    fn summarize(&self) -> RunSummary {
        let newly_unlocked = self.store.newly_unlocked().to_vec();
        let mut banners = Vec::with_capacity(newly_unlocked.len());
        for id in &newly_unlocked {
            let info = self
                .achievements
                .iter()
                .find(|a| a.id() == *id)
                .map(|a| a.info())
                .or_else(|| self.registry.get(id.as_str()).map(|e| e.info));
            match info {
                Some(info) => banners.push(render_banner(info)),
                None => warn!("no metadata for unlocked achievement {id}, skipping banner"),
            }
        }
        RunSummary {
            newly_unlocked,
            banners,
            hook_failures: self.failures.clone(),
        }
    }

    fn expect_state(&self, event: EventKind, expected: EngineState) -> Result<(), EngineError> {
        if self.state == expected {
            return Ok(());
        }
        warn!("rejecting {event} event while {}", self.state);
        Err(EngineError::InvalidState {
            event,
            state: self.state,
        })
    }

    /// Call `hook` on every still-locked achievement, re-checking before each call
    fn dispatch<F>(&mut self, event: EventKind, mut hook: F)
    where
        F: FnMut(&mut dyn Achievement, &mut StoreHandle<'_>) -> HookResult,
    {
        for achievement in &mut self.achievements {
            let id = achievement.id();
            if self.store.is_unlocked(&id) {
                continue;
            }
            let mut handle = StoreHandle::new(&mut self.store, &id);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                hook(&mut **achievement, &mut handle)
            }));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            warn!("{id} failed during {event}: {message}");
            self.failures.push(HookFailure {
                achievement: id,
                event,
                message,
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
