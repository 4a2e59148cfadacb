//! ach-catalog: Built-in achievements
//!
//! Each achievement is a small independent rule over the facts the engine
//! records (`result.*`, `time.*`) plus whatever it stores for itself.
//! [`builtin_registry`] lists them for discovery mode.

pub mod mocking;
pub mod results;
pub mod timing;

use ach_core::{Achievement, Registry};

pub use mocking::MockingMe;
pub use results::{CompleteFailure, HappyEnding, Marathon, MinorLetdown};
pub use timing::{CoffeeBreak, InstantFeedback, NightShift};

/// Every built-in kind, in discovery order
pub fn builtin_registry() -> Registry {
    Registry::new()
        .with(&results::HAPPY_ENDING, || boxed(HappyEnding::default()))
        .with(&results::MINOR_LETDOWN, || boxed(MinorLetdown::default()))
        .with(&results::COMPLETE_FAILURE, || boxed(CompleteFailure::default()))
        .with(&timing::NIGHT_SHIFT, || boxed(NightShift::default()))
        .with(&timing::INSTANT_FEEDBACK, || boxed(InstantFeedback::default()))
        .with(&timing::COFFEE_BREAK, || boxed(CoffeeBreak::default()))
        .with(&results::MARATHON, || boxed(Marathon::default()))
        .with(&mocking::MOCKING_ME, || boxed(MockingMe::from_lockfile("Cargo.lock")))
}

fn boxed(achievement: impl Achievement + 'static) -> Box<dyn Achievement> {
    Box::new(achievement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_and_ids() {
        let ids: Vec<&str> = builtin_registry().entries().iter().map(|e| e.info.id).collect();
        assert_eq!(
            ids,
            [
                "happy-ending",
                "minor-letdown",
                "complete-failure",
                "night-shift",
                "instant-feedback",
                "coffee-break",
                "marathon",
                "mocking-me"
            ]
        );
    }

    #[test]
    fn test_built_instances_match_their_entry() {
        for entry in builtin_registry().entries() {
            let achievement = (entry.build)();
            assert_eq!(achievement.id(), entry.info.achievement_id());
            assert!(!entry.info.title.is_empty());
            assert!(!entry.info.message.is_empty());
        }
    }
}
