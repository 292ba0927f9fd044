//! The persisted progression root and its initialization rules.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logutil::escape_log;
use crate::progression::challenge::{Challenge, ChallengeCatalog};
use crate::progression::errors::ProgressionError;
use crate::progression::level::{level_info, LevelInfo};
use crate::progression::types::{default_true, Configuration, Event};

pub const STATE_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionState {
    pub schema_version: u8,
    /// Set once the first initialization has run.
    pub has_executed: bool,
    pub nickname: String,
    pub total_xp: u64,
    pub event_counts: BTreeMap<Event, u64>,
    /// At most one active challenge per event.
    pub active_challenges: BTreeMap<Event, Challenge>,
    /// Append-only archive, oldest first.
    pub completed_challenges: Vec<Challenge>,
    pub show_completed_challenges: bool,
    pub configuration: Configuration,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            has_executed: false,
            nickname: String::new(),
            total_xp: 0,
            event_counts: BTreeMap::new(),
            active_challenges: BTreeMap::new(),
            completed_challenges: Vec::new(),
            show_completed_challenges: true,
            configuration: Configuration::default(),
        }
    }
}

/// What a call to [`ProgressionState::initialize`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub first_run: bool,
    pub counters_added: usize,
    pub challenges_added: usize,
    pub challenges_repaired: usize,
    /// Events with no catalog entry; they stay without a challenge.
    pub missing_templates: Vec<Event>,
}

impl InitReport {
    pub fn changed(&self) -> bool {
        self.first_run
            || self.counters_added > 0
            || self.challenges_added > 0
            || self.challenges_repaired > 0
    }
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill missing counters and challenges. Safe to run on every load: an
    /// existing valid challenge is never replaced, counters are never reset.
    /// A stored challenge that breaks its invariants is reset to the catalog
    /// default for that event.
    pub fn initialize(&mut self, catalog: &ChallengeCatalog) -> InitReport {
        let mut report = InitReport::default();

        if !self.has_executed {
            self.has_executed = true;
            report.first_run = true;
        }
        self.schema_version = STATE_SCHEMA_VERSION;

        for event in Event::ALL {
            if !self.event_counts.contains_key(&event) {
                self.event_counts.insert(event, 0);
                report.counters_added += 1;
            }
        }

        for event in Event::trackable() {
            let mut repairing = false;
            if let Some(existing) = self.active_challenges.get(&event) {
                match existing.validate(event) {
                    Ok(()) => continue,
                    Err(e) => {
                        warn!("Resetting stored challenge: {}", e);
                        self.active_challenges.remove(&event);
                        report.challenges_repaired += 1;
                        repairing = true;
                    }
                }
            }

            match catalog.default_challenge(event) {
                Some(challenge) => {
                    self.active_challenges.insert(event, challenge);
                    if !repairing {
                        report.challenges_added += 1;
                    }
                }
                None => {
                    warn!("No catalog challenge for event '{}'; skipping", event);
                    report.missing_templates.push(event);
                }
            }
        }

        if report.changed() {
            debug!(
                "Initialized progression state: first_run={} counters+{} challenges+{} repaired={}",
                report.first_run,
                report.counters_added,
                report.challenges_added,
                report.challenges_repaired
            );
        }
        report
    }

    pub fn event_count(&self, event: Event) -> u64 {
        self.event_counts.get(&event).copied().unwrap_or(0)
    }

    pub fn active_challenge(&self, event: Event) -> Option<&Challenge> {
        self.active_challenges.get(&event)
    }

    pub fn level_info(&self) -> LevelInfo {
        level_info(self.total_xp)
    }

    pub fn set_nickname(&mut self, nickname: &str) {
        info!("Nickname set to '{}'", escape_log(nickname));
        self.nickname = nickname.to_string();
    }

    pub fn set_show_completed_challenges(&mut self, show: bool) {
        self.show_completed_challenges = show;
    }

    pub fn set_configuration(&mut self, configuration: Configuration) {
        self.configuration = configuration;
    }

    /// Decode a stored JSON document, dropping entries this build does not
    /// understand instead of failing the whole load. Run
    /// [`ProgressionState::initialize`] afterwards to refill dropped slots.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ProgressionError> {
        let stored: StoredState = serde_json::from_slice(bytes)?;
        stored.into_state()
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, ProgressionError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Loose mirror of [`ProgressionState`] used when reading saves that may come
/// from an older or newer build.
#[derive(Deserialize)]
struct StoredState {
    #[serde(default)]
    schema_version: u8,
    #[serde(default)]
    has_executed: bool,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    total_xp: u64,
    #[serde(default)]
    event_counts: BTreeMap<String, u64>,
    #[serde(default)]
    active_challenges: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    completed_challenges: Vec<serde_json::Value>,
    #[serde(default = "default_true")]
    show_completed_challenges: bool,
    #[serde(default)]
    configuration: Configuration,
}

impl StoredState {
    fn into_state(self) -> Result<ProgressionState, ProgressionError> {
        if self.schema_version > STATE_SCHEMA_VERSION {
            return Err(ProgressionError::SchemaMismatch {
                entity: "progression state",
                expected: STATE_SCHEMA_VERSION,
                found: self.schema_version,
            });
        }

        let mut event_counts = BTreeMap::new();
        for (key, count) in self.event_counts {
            match key.parse::<Event>() {
                Ok(event) => {
                    event_counts.insert(event, count);
                }
                Err(_) => warn!("Dropping count for unknown event '{}'", escape_log(&key)),
            }
        }

        let mut active_challenges = BTreeMap::new();
        for (key, value) in self.active_challenges {
            let Ok(event) = key.parse::<Event>() else {
                warn!("Dropping challenge for unknown event '{}'", escape_log(&key));
                continue;
            };
            match serde_json::from_value::<Challenge>(value) {
                Ok(challenge) => {
                    active_challenges.insert(event, challenge);
                }
                Err(e) => warn!("Dropping unreadable challenge for '{}': {}", event, e),
            }
        }

        let mut completed_challenges = Vec::with_capacity(self.completed_challenges.len());
        for value in self.completed_challenges {
            match serde_json::from_value::<Challenge>(value) {
                Ok(challenge) => completed_challenges.push(challenge),
                Err(e) => warn!("Dropping unreadable completed challenge: {}", e),
            }
        }

        Ok(ProgressionState {
            schema_version: STATE_SCHEMA_VERSION,
            has_executed: self.has_executed,
            nickname: self.nickname,
            total_xp: self.total_xp,
            event_counts,
            active_challenges,
            completed_challenges,
            show_completed_challenges: self.show_completed_challenges,
            configuration: self.configuration,
        })
    }
}
