//! ach-core: Achievement evaluation engine for test runs
//!
//! Observes the lifecycle of a single test run, feeds every event to the
//! registered achievements that are still locked, and persists unlock state
//! between runs. Concrete achievements live in `ach-catalog`; this crate only
//! holds the contract, the store and the dispatch loop.

pub mod achievement;
pub mod config;
pub mod engine;
pub mod event;
pub mod persist;
pub mod report;
pub mod runner;
pub mod store;

pub use achievement::{
    Achievement, AchievementId, AchievementInfo, HookError, HookResult, Registry, RegistryEntry,
};
pub use config::EngineConfig;
pub use engine::{Engine, EngineError, EngineState, HookFailure};
pub use event::{EventKind, RunResult, TestCase, TestOutcome};
pub use report::RunSummary;
pub use store::{StoreError, StoreHandle, UnlockStore};
