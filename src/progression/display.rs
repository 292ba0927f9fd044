/// Text rendering for notices, challenge lines and the status dashboard.
use crate::progression::challenge::Challenge;
use crate::progression::engine::ProgressionNotice;
use crate::progression::level::LevelInfo;
use crate::progression::state::ProgressionState;
use crate::progression::types::Event;

const PROGRESS_BAR_WIDTH: usize = 20;

/// Group digits in threes: `1234567` -> `"1,234,567"`.
pub fn format_number_with_commas(number: u64) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * PROGRESS_BAR_WIDTH) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

pub fn format_level_up(nickname: &str, level: &LevelInfo) -> String {
    let who = if nickname.trim().is_empty() {
        String::new()
    } else {
        format!(" {}", nickname.trim())
    };
    format!(
        "Level up! Congratulations{}! You are now level {}. You need {} XP to reach the next level.",
        who,
        level.level,
        format_number_with_commas(level.xp_to_next_level())
    )
}

pub fn format_challenge_complete(challenge: &Challenge) -> String {
    format!(
        "{} completed! Reward: {} XP",
        challenge.name,
        format_number_with_commas(challenge.reward_xp)
    )
}

/// One-line summary: name, description, progress and reward. Open
/// challenges also show how many events are left.
pub fn format_challenge_line(challenge: &Challenge) -> String {
    let (status, left) = if challenge.is_completed() {
        ("✓", String::new())
    } else {
        (
            " ",
            format!(" ({} to go)", format_number_with_commas(challenge.remaining())),
        )
    };
    format!(
        "[{}] {} - {} [{}/{}]{} +{} XP",
        status,
        challenge.name,
        challenge.display_description(),
        format_number_with_commas(challenge.progress),
        format_number_with_commas(challenge.goal),
        left,
        format_number_with_commas(challenge.reward_xp)
    )
}

/// Human readable form of an engine notice, for consoles and logs.
pub fn format_notice(nickname: &str, notice: &ProgressionNotice) -> String {
    match notice {
        ProgressionNotice::XpChanged { gained, level } => format!(
            "+{} XP (level {}, {}%)",
            format_number_with_commas(*gained),
            level.level,
            level.progress_percent
        ),
        ProgressionNotice::LevelUp { level, .. } => format_level_up(nickname, level),
        ProgressionNotice::ChallengeProgressed { challenge, .. } => format!(
            "{}: {}/{}",
            challenge.name,
            format_number_with_commas(challenge.progress),
            format_number_with_commas(challenge.goal)
        ),
        ProgressionNotice::ChallengeCompleted {
            completed, next, ..
        } => format!(
            "{} Next: {}",
            format_challenge_complete(completed),
            next.display_description()
        ),
    }
}

pub fn format_dashboard(state: &ProgressionState) -> String {
    let level = state.level_info();
    let name = if state.nickname.is_empty() {
        "Anonymous"
    } else {
        state.nickname.as_str()
    };

    let mut output = format!("=== {} ===\n", name);
    output.push_str(&format!(
        "Level {}  {} {}%\n",
        level.level,
        progress_bar(level.progress_percent),
        level.progress_percent
    ));
    output.push_str(&format!(
        "XP: {} total, {}/{} this level\n",
        format_number_with_commas(state.total_xp),
        format_number_with_commas(level.xp_into_current_level),
        format_number_with_commas(level.xp_required_for_next_level)
    ));

    output.push_str("\n--- Events ---\n");
    for event in Event::trackable() {
        output.push_str(&format!(
            "{:<10} x{:<8} (+{} XP each)\n",
            event.display_name(),
            format_number_with_commas(state.event_count(event)),
            event.base_xp()
        ));
    }

    output.push_str("\n--- Challenges ---\n");
    for challenge in state.active_challenges.values() {
        output.push_str(&format_challenge_line(challenge));
        output.push('\n');
    }

    if state.show_completed_challenges && !state.completed_challenges.is_empty() {
        output.push_str(&format!(
            "\n--- Completed ({}) ---\n",
            state.completed_challenges.len()
        ));
        for challenge in state.completed_challenges.iter().rev() {
            output.push_str(&format_challenge_line(challenge));
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::challenge::ChallengeCatalog;
    use crate::progression::level::level_info;

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_number_with_commas(123_456_789), "123,456,789");
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(12_345), "12,345");
        assert_eq!(format_number_with_commas(999), "999");
        assert_eq!(format_number_with_commas(1_000), "1,000");
    }

    #[test]
    fn level_up_message_names_user() {
        let text = format_level_up("ada", &level_info(300));
        assert_eq!(
            text,
            "Level up! Congratulations ada! You are now level 2. You need 315 XP to reach the next level."
        );
        assert!(format_level_up("  ", &level_info(300)).starts_with("Level up! Congratulations!"));
    }

    #[test]
    fn challenge_complete_message() {
        let save = ChallengeCatalog::standard()
            .default_challenge(Event::Save)
            .unwrap();
        assert_eq!(format_challenge_complete(&save), "Save Challenge completed! Reward: 300 XP");
    }

    #[test]
    fn challenge_line_shows_remaining() {
        let mut typing = ChallengeCatalog::standard()
            .default_challenge(Event::Typing)
            .unwrap();
        typing.progress = 40;
        assert_eq!(
            format_challenge_line(&typing),
            "[ ] Typing Challenge - Typing 100 times. [40/100] (60 to go) +100 XP"
        );

        typing.progress = 100;
        assert_eq!(
            format_challenge_line(&typing),
            "[✓] Typing Challenge - Typing 100 times. [100/100] +100 XP"
        );
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(250), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn dashboard_hides_completed_when_disabled() {
        let mut state = ProgressionState::new();
        state.initialize(&ChallengeCatalog::standard());
        let mut done = state.active_challenge(Event::Run).unwrap().clone();
        done.progress = done.goal;
        state.completed_challenges.push(done);

        let shown = format_dashboard(&state);
        assert!(shown.contains("Anonymous"));
        assert!(shown.contains("--- Completed (1) ---"));
        assert!(shown.contains("Typing 100 times."));

        state.set_show_completed_challenges(false);
        assert!(!format_dashboard(&state).contains("Completed"));
    }
}
