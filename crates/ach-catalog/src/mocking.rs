//! Mocking library detection

use std::path::Path;

use ach_core::{Achievement, AchievementInfo, HookResult, RunResult, StoreHandle};
use tracing::debug;

pub static MOCKING_ME: AchievementInfo = AchievementInfo {
    id: "mocking-me",
    title: "Mocking Me",
    subtitle: "Tests passed with a mocking library",
    message: "Are you mocking me?",
};

/// Crate names that count as mocking libraries
pub const MOCKING_CRATES: &[&str] = &[
    "mockall",
    "mockito",
    "mockers",
    "mocktopus",
    "mock-it",
    "mockiato",
    "faux",
    "double",
    "unimock",
    "mry",
    "httpmock",
    "wiremock",
    "simulacrum",
    "galvanic-mock",
];

/// Successful, non-empty run while a mocking crate is a dependency
#[derive(Debug, Default)]
pub struct MockingMe {
    crates: Vec<String>,
}

impl MockingMe {
    /// Use an explicit list of crate names in the build
    pub fn new<I, S>(crates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            crates: crates.into_iter().map(Into::into).collect(),
        }
    }

    /// Take crate names from a `Cargo.lock`; an unreadable file means no crates
    pub fn from_lockfile(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::new(locked_crate_names(&contents)),
            Err(err) => {
                debug!("no crate list from {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn mocking_crate(&self) -> Option<&str> {
        self.crates
            .iter()
            .map(String::as_str)
            .find(|name| MOCKING_CRATES.contains(name))
    }
}

impl Achievement for MockingMe {
    fn info(&self) -> &'static AchievementInfo {
        &MOCKING_ME
    }

    fn finalize(&mut self, store: &mut StoreHandle<'_>, result: &RunResult) -> HookResult {
        if result.tests_run == 0 || !result.was_successful() {
            return Ok(());
        }
        if let Some(name) = self.mocking_crate() {
            debug!("mocking crate {name} found");
            store.unlock();
        }
        Ok(())
    }
}

/// Package names listed in a `Cargo.lock`
pub fn locked_crate_names(lockfile: &str) -> Vec<String> {
    lockfile
        .lines()
        .filter_map(|line| line.trim().strip_prefix("name = "))
        .map(|value| value.trim_matches('"').to_string())
        .collect()
}
