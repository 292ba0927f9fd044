/// Challenges and the default challenge catalog.
///
/// A challenge counts occurrences of one event. When its progress reaches the
/// goal it is archived and replaced by a harder challenge for the same event.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::display::format_number_with_commas;
use crate::progression::errors::ProgressionError;
use crate::progression::types::Event;

const GOAL_PLACEHOLDER: &str = "[goal]";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    /// Fresh for every challenge, including escalated replacements. Saves
    /// without one get a new id on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub event: Event,
    pub name: String,
    /// May contain a `[goal]` placeholder.
    pub description: String,
    #[serde(default)]
    pub progress: u64,
    pub goal: u64,
    pub reward_xp: u64,
    #[serde(default)]
    pub reward_xp_increment: u64,
    #[serde(default)]
    pub goal_increment: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Set when the challenge is archived.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    pub fn new(
        event: Event,
        name: &str,
        description: &str,
        goal: u64,
        reward_xp: u64,
        reward_xp_increment: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            name: name.to_string(),
            description: description.to_string(),
            progress: 0,
            goal,
            reward_xp,
            reward_xp_increment,
            goal_increment: goal,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Override the goal escalation step (defaults to the initial goal).
    pub fn with_goal_increment(mut self, goal_increment: u64) -> Self {
        self.goal_increment = goal_increment;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.progress >= self.goal
    }

    pub fn remaining(&self) -> u64 {
        self.goal.saturating_sub(self.progress)
    }

    pub fn mark_completed(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Description with `[goal]` replaced by the comma-grouped goal.
    pub fn display_description(&self) -> String {
        self.description
            .replace(GOAL_PLACEHOLDER, &format_number_with_commas(self.goal))
    }

    /// Check the invariants of an active challenge stored under `slot`.
    pub fn validate(&self, slot: Event) -> Result<(), ProgressionError> {
        let reason = if self.event != slot {
            format!("stored under {} but tracks {}", slot, self.event)
        } else if self.goal == 0 {
            "goal must be greater than zero".to_string()
        } else if self.is_completed() {
            format!(
                "progress {} already meets goal {} while active",
                self.progress, self.goal
            )
        } else {
            return Ok(());
        };
        Err(ProgressionError::CorruptChallenge { event: slot, reason })
    }
}

/// Build the escalated successor of a completed challenge.
pub fn create_next_challenge(completed: &Challenge) -> Challenge {
    Challenge {
        id: Uuid::new_v4(),
        event: completed.event,
        name: completed.name.clone(),
        description: completed.description.clone(),
        progress: 0,
        goal: completed.goal.saturating_add(completed.goal_increment),
        reward_xp: completed.reward_xp.saturating_add(completed.reward_xp_increment),
        reward_xp_increment: completed.reward_xp_increment,
        goal_increment: completed.goal_increment,
        created_at: Utc::now(),
        completed_at: None,
    }
}

/// Static description of a catalog challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeTemplate {
    pub event: Event,
    pub name: &'static str,
    pub description: &'static str,
    pub goal: u64,
    pub reward_xp: u64,
    pub reward_xp_increment: u64,
}

impl ChallengeTemplate {
    pub fn instantiate(&self) -> Challenge {
        Challenge::new(
            self.event,
            self.name,
            self.description,
            self.goal,
            self.reward_xp,
            self.reward_xp_increment,
        )
    }
}

const STANDARD_TEMPLATES: [ChallengeTemplate; 12] = [
    ChallengeTemplate {
        event: Event::Typing,
        name: "Typing Challenge",
        description: "Typing [goal] times.",
        goal: 100,
        reward_xp: 100,
        reward_xp_increment: 200,
    },
    ChallengeTemplate {
        event: Event::Cut,
        name: "Cut Challenge",
        description: "Cut [goal] times.",
        goal: 10,
        reward_xp: 100,
        reward_xp_increment: 150,
    },
    ChallengeTemplate {
        event: Event::Copy,
        name: "Copy Challenge",
        description: "Copy [goal] times.",
        goal: 10,
        reward_xp: 100,
        reward_xp_increment: 150,
    },
    ChallengeTemplate {
        event: Event::Paste,
        name: "Paste Challenge",
        description: "Paste [goal] times.",
        goal: 10,
        reward_xp: 100,
        reward_xp_increment: 150,
    },
    ChallengeTemplate {
        event: Event::Backspace,
        name: "Backspace Challenge",
        description: "Press the backspace key [goal] times.",
        goal: 50,
        reward_xp: 100,
        reward_xp_increment: 150,
    },
    ChallengeTemplate {
        event: Event::Tab,
        name: "Tab Challenge",
        description: "Press the tab key [goal] times.",
        goal: 50,
        reward_xp: 100,
        reward_xp_increment: 150,
    },
    ChallengeTemplate {
        event: Event::Enter,
        name: "Enter Challenge",
        description: "Press the enter key [goal] times.",
        goal: 10,
        reward_xp: 100,
        reward_xp_increment: 200,
    },
    ChallengeTemplate {
        event: Event::Save,
        name: "Save Challenge",
        description: "Save [goal] times.",
        goal: 10,
        reward_xp: 300,
        reward_xp_increment: 400,
    },
    ChallengeTemplate {
        event: Event::Build,
        name: "Build Challenge",
        description: "Build [goal] times.",
        goal: 10,
        reward_xp: 150,
        reward_xp_increment: 200,
    },
    ChallengeTemplate {
        event: Event::Run,
        name: "Run Challenge",
        description: "Run [goal] times.",
        goal: 10,
        reward_xp: 200,
        reward_xp_increment: 250,
    },
    ChallengeTemplate {
        event: Event::Debug,
        name: "Debug Challenge",
        description: "Debug [goal] times.",
        goal: 10,
        reward_xp: 300,
        reward_xp_increment: 400,
    },
    ChallengeTemplate {
        event: Event::Action,
        name: "Action Challenge",
        description: "Perform [goal] actions.",
        goal: 20,
        reward_xp: 100,
        reward_xp_increment: 120,
    },
];

/// Source of the initial challenge for each event.
#[derive(Debug, Clone)]
pub struct ChallengeCatalog {
    templates: Vec<ChallengeTemplate>,
}

impl ChallengeCatalog {
    pub fn new(templates: Vec<ChallengeTemplate>) -> Self {
        Self { templates }
    }

    /// One challenge per trackable event.
    pub fn standard() -> Self {
        Self::new(STANDARD_TEMPLATES.to_vec())
    }

    pub fn templates(&self) -> &[ChallengeTemplate] {
        &self.templates
    }

    pub fn default_challenges(&self) -> Vec<Challenge> {
        self.templates.iter().map(ChallengeTemplate::instantiate).collect()
    }

    pub fn default_challenge(&self, event: Event) -> Option<Challenge> {
        self.templates
            .iter()
            .find(|template| template.event == event)
            .map(ChallengeTemplate::instantiate)
    }
}

impl Default for ChallengeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
