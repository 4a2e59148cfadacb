//! Unlock banners shown at the end of a run

use std::io::{self, Write};

use crate::achievement::{AchievementId, AchievementInfo};
use crate::engine::HookFailure;

/// Single-line banner for a freshly unlocked achievement
pub fn render_banner(info: &AchievementInfo) -> String {
    format!("Achievement unlocked! {}: {}", info.title, info.message)
}

/// Write one line per banner, in order
pub fn write_banners(out: &mut dyn Write, banners: &[String]) -> io::Result<()> {
    for banner in banners {
        writeln!(out, "{banner}")?;
    }
    out.flush()
}

/// What a finished run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Kinds unlocked during this run, in unlock order
    pub newly_unlocked: Vec<AchievementId>,
    /// Banner lines written to the output stream
    pub banners: Vec<String>,
    /// Hooks that failed during the run
    pub hook_failures: Vec<HookFailure>,
}

impl RunSummary {
    pub fn unlocked_anything(&self) -> bool {
        !self.newly_unlocked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INFO: AchievementInfo = AchievementInfo {
        id: "night-shift",
        title: "Night Shift",
        subtitle: "Ran tests between midnight and 5am",
        message: "Get some sleep.",
    };

    #[test]
    fn test_banner_is_one_line() {
        let banner = render_banner(&INFO);
        assert_eq!(banner, "Achievement unlocked! Night Shift: Get some sleep.");
        assert!(!banner.contains('\n'));
    }

    #[test]
    fn test_write_banners() {
        let mut out = Vec::new();
        write_banners(&mut out, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_no_banners_no_output() {
        let mut out = Vec::new();
        write_banners(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
