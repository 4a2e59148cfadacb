//! Achievement contract
//!
//! Every achievement observes the same fixed set of lifecycle hooks. All
//! hooks default to doing nothing, so a rule only implements the events it
//! cares about. Unlock state is keyed by the achievement's kind, never by the
//! instance, so differently configured instances of one kind share it.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{RunResult, TestCase};
use crate::store::{StoreError, StoreHandle};

/// Stable identity of an achievement kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(Cow<'static, str>);

impl AchievementId {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(Cow::Owned(kind.into()))
    }

    pub const fn from_static(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of an achievement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementInfo {
    /// Kind id used as the unlock key (e.g. `night-shift`)
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Shown in the unlock banner
    pub message: &'static str,
}

impl AchievementInfo {
    pub const fn achievement_id(&self) -> AchievementId {
        AchievementId::from_static(self.id)
    }
}

/// Failure raised by an achievement hook
#[derive(Debug, Error)]
pub enum HookError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Failed(String),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type HookResult = Result<(), HookError>;

/// A rule that observes a test run and may unlock itself
///
/// The engine never calls a hook of an achievement whose kind is already
/// unlocked, so implementations do not need to check that themselves.
pub trait Achievement {
    /// Kind metadata; the same value for every instance of a kind
    fn info(&self) -> &'static AchievementInfo;

    fn id(&self) -> AchievementId {
        self.info().achievement_id()
    }

    fn begin(&mut self, _store: &mut StoreHandle<'_>) -> HookResult {
        Ok(())
    }

    fn prepare_test(&mut self, _store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        Ok(())
    }

    fn start_test(&mut self, _store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        Ok(())
    }

    fn stop_test(&mut self, _store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        Ok(())
    }

    fn after_test(&mut self, _store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
        Ok(())
    }

    /// The host handed the engine its output stream
    fn output_ready(&mut self, _store: &mut StoreHandle<'_>, _out: &mut dyn Write) -> HookResult {
        Ok(())
    }

    fn report(&mut self, _store: &mut StoreHandle<'_>, _out: &mut dyn Write) -> HookResult {
        Ok(())
    }

    fn finalize(&mut self, _store: &mut StoreHandle<'_>, _result: &RunResult) -> HookResult {
        Ok(())
    }
}

/// Registry entry: kind metadata plus a constructor for discovery
#[derive(Clone, Copy)]
pub struct RegistryEntry {
    pub info: &'static AchievementInfo,
    pub build: fn() -> Box<dyn Achievement>,
}

/// Ordered list of known achievement kinds
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind; a kind registered twice keeps its first position
    pub fn register(
        &mut self,
        info: &'static AchievementInfo,
        build: fn() -> Box<dyn Achievement>,
    ) {
        if self.get(info.id).is_none() {
            self.entries.push(RegistryEntry { info, build });
        }
    }

    pub fn with(
        mut self,
        info: &'static AchievementInfo,
        build: fn() -> Box<dyn Achievement>,
    ) -> Self {
        self.register(info, build);
        self
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.info.id == id)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.info.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UnlockStore;

    static COUNTER: AchievementInfo = AchievementInfo {
        id: "counter",
        title: "Counter",
        subtitle: "Counts tests",
        message: "You counted some tests.",
    };

    struct Counter {
        threshold: u32,
        seen: u32,
    }

    impl Achievement for Counter {
        fn info(&self) -> &'static AchievementInfo {
            &COUNTER
        }

        fn after_test(&mut self, store: &mut StoreHandle<'_>, _test: &TestCase) -> HookResult {
            self.seen += 1;
            if self.seen >= self.threshold {
                store.unlock();
            }
            Ok(())
        }
    }

    #[test]
    fn test_identity_ignores_instance_state() {
        let low = Counter { threshold: 1, seen: 0 };
        let high = Counter { threshold: 100, seen: 42 };
        assert_eq!(low.id(), high.id());

        let mut store = UnlockStore::new();
        store.unlock(&low.id());
        assert!(store.is_unlocked(&high.id()));
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let mut counter = Counter { threshold: 1, seen: 0 };
        let mut store = UnlockStore::new();
        let id = counter.id();
        let mut handle = StoreHandle::new(&mut store, &id);
        counter.begin(&mut handle).unwrap();
        counter.finalize(&mut handle, &RunResult::default()).unwrap();
        assert!(!store.is_unlocked(&id));
        assert_eq!(store.facts().count(), 0);
    }

    #[test]
    fn test_registry_keeps_first_registration() {
        fn build() -> Box<dyn Achievement> {
            Box::new(Counter { threshold: 1, seen: 0 })
        }
        let registry = Registry::new().with(&COUNTER, build).with(&COUNTER, build);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("counter").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_id_display_and_serde() {
        let id = AchievementId::from_static("night-shift");
        assert_eq!(id.to_string(), "night-shift");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"night-shift\"");
        let back: AchievementId = serde_json::from_str("\"night-shift\"").unwrap();
        assert_eq!(back, id);
    }
}
