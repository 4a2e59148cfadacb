//! Persistent achievement data
//!
//! The store is a bag of facts (string keys to JSON values) plus the set of
//! achievement kinds that are unlocked. Facts survive across runs; the list
//! of kinds unlocked during the current run does not.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::achievement::AchievementId;

/// Current store file format version
pub const STORE_VERSION: u32 = 1;

/// Store load/save errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid store file header")]
    InvalidHeader,

    #[error("Incompatible store version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },
}

/// Store file header for versioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHeader {
    /// Magic identifier
    pub magic: String,
    /// Store format version
    pub version: u32,
    /// Unix timestamp of the save
    pub saved_at: i64,
}

impl StoreHeader {
    const MAGIC: &'static str = "ACHV";

    pub fn new() -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: STORE_VERSION,
            saved_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.magic != Self::MAGIC {
            return Err(StoreError::InvalidHeader);
        }
        if self.version != STORE_VERSION {
            return Err(StoreError::IncompatibleVersion {
                expected: STORE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

impl Default for StoreHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk layout: header followed by the store itself
#[derive(Serialize, Deserialize)]
struct StoreFile<S> {
    header: StoreHeader,
    store: S,
}

/// Facts and unlock state shared by all achievements of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlockStore {
    #[serde(default)]
    facts: BTreeMap<String, Value>,

    #[serde(default)]
    unlocked: BTreeSet<AchievementId>,

    /// Kinds unlocked since this store was created or loaded, in unlock order
    #[serde(skip)]
    newly_unlocked: Vec<AchievementId>,
}

impl UnlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a store written by [`UnlockStore::save`]
    pub fn load(reader: impl Read) -> Result<Self, StoreError> {
        let file: StoreFile<UnlockStore> = serde_json::from_reader(reader)?;
        file.header.validate()?;
        Ok(file.store)
    }

    /// Write facts and the unlocked set; the newly unlocked list is not saved
    pub fn save(&self, mut writer: impl Write) -> Result<(), StoreError> {
        let file = StoreFile {
            header: StoreHeader::new(),
            store: self,
        };
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;
        Ok(())
    }

    /// Raw fact lookup
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }

    /// Typed fact lookup; a value of the wrong shape reads as missing
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.facts
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), StoreError> {
        self.facts.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Write only when the key is missing; returns whether a write happened
    pub fn set_if_absent<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<bool, StoreError> {
        let key = key.into();
        if self.facts.contains_key(&key) {
            return Ok(false);
        }
        self.facts.insert(key, serde_json::to_value(value)?);
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.facts.remove(key)
    }

    pub fn facts(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_unlocked(&self, id: &AchievementId) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlock a kind; returns true only on the locked to unlocked transition
    pub fn unlock(&mut self, id: &AchievementId) -> bool {
        if !self.unlocked.insert(id.clone()) {
            return false;
        }
        self.newly_unlocked.push(id.clone());
        true
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &AchievementId> {
        self.unlocked.iter()
    }

    pub fn newly_unlocked(&self) -> &[AchievementId] {
        &self.newly_unlocked
    }

    /// Forget what earlier runs unlocked; the unlocked set is kept
    pub fn start_run(&mut self) {
        self.newly_unlocked.clear();
    }
}

/// View of the store handed to one achievement's hook
///
/// Any fact may be read or written, but only the owning achievement can be
/// unlocked through it.
pub struct StoreHandle<'a> {
    store: &'a mut UnlockStore,
    owner: &'a AchievementId,
}

impl<'a> StoreHandle<'a> {
    pub fn new(store: &'a mut UnlockStore, owner: &'a AchievementId) -> Self {
        Self { store, owner }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store.get(key)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.store.get_or(key, default)
    }

    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), StoreError> {
        self.store.set(key, value)
    }

    pub fn set_if_absent<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<bool, StoreError> {
        self.store.set_if_absent(key, value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    pub fn is_unlocked(&self, id: &AchievementId) -> bool {
        self.store.is_unlocked(id)
    }

    /// Unlock the achievement owning this handle
    pub fn unlock(&mut self) -> bool {
        self.store.unlock(self.owner)
    }
}
