//! Level curve: cumulative XP to level and progress.
//!
//! Level 1 needs 300 XP; every later level needs 5% more than the one before.
//! Thresholds are accumulated as `f64` step by step (not from a closed form) so
//! that existing XP totals map to the same levels they always have.

use serde::{Deserialize, Serialize};

const FIRST_LEVEL_XP: f64 = 300.0;
const LEVEL_GROWTH: f64 = 1.05;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub xp_into_current_level: u64,
    /// Progress towards the next level, 0..=100.
    pub progress_percent: u32,
    /// Size of the current level in XP.
    pub xp_required_for_next_level: u64,
}

impl LevelInfo {
    /// XP still missing before the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        self.xp_required_for_next_level
            .saturating_sub(self.xp_into_current_level)
    }
}

/// Derive level information from total XP. Never store the result; always
/// recompute it from the XP total.
pub fn level_info(total_xp: u64) -> LevelInfo {
    let total = total_xp as f64;
    let mut level: u32 = 1;
    let mut required = FIRST_LEVEL_XP;
    let mut accumulated = FIRST_LEVEL_XP;

    while total >= accumulated {
        level += 1;
        required *= LEVEL_GROWTH;
        accumulated += required;
    }

    let level_start = (accumulated - required) as u64;
    let xp_into_current_level = total_xp.saturating_sub(level_start);
    let progress_percent = ((xp_into_current_level as f64 / required * 100.0) as u32).min(100);

    LevelInfo {
        level,
        xp_into_current_level,
        progress_percent,
        xp_required_for_next_level: required as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_xp_is_level_one() {
        assert_eq!(
            level_info(0),
            LevelInfo {
                level: 1,
                xp_into_current_level: 0,
                progress_percent: 0,
                xp_required_for_next_level: 300,
            }
        );
    }

    #[test]
    fn first_threshold_reaches_level_two() {
        assert_eq!(
            level_info(300),
            LevelInfo {
                level: 2,
                xp_into_current_level: 0,
                progress_percent: 0,
                xp_required_for_next_level: 315,
            }
        );
    }

    #[test]
    fn just_below_threshold() {
        let info = level_info(299);
        assert_eq!(info.level, 1);
        assert_eq!(info.xp_into_current_level, 299);
        assert_eq!(info.progress_percent, 99);
        assert_eq!(info.xp_to_next_level(), 1);
    }

    #[test]
    fn third_level_truncates_fractional_threshold() {
        // 300 + 315 = 615 reaches level 3, whose size is 330.75 truncated.
        let info = level_info(615);
        assert_eq!(info.level, 3);
        assert_eq!(info.xp_into_current_level, 0);
        assert_eq!(info.xp_required_for_next_level, 330);

        let mid = level_info(780);
        assert_eq!(mid.level, 3);
        assert_eq!(mid.xp_into_current_level, 165);
        assert_eq!(mid.progress_percent, 49);
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut previous = level_info(0);
        for xp in (0..200_000u64).step_by(7) {
            let info = level_info(xp);
            assert!(info.level >= 1);
            assert!(info.level >= previous.level, "level dropped at {}", xp);
            assert!(info.progress_percent <= 100);
            assert!(info.xp_required_for_next_level > 0);
            previous = info;
        }
    }
}
