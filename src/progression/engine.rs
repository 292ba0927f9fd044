//! Event recording, XP accounting and the challenge lifecycle.
//!
//! [`ProgressionEngine`] owns one [`ProgressionState`]. Every call to
//! [`ProgressionEngine::record_event`] runs to completion (counter, XP,
//! challenge, archive, replacement) before notices are delivered, so a
//! snapshot taken between calls never sees a half-applied event.
//! Multi-threaded hosts wrap the engine in [`SharedProgression`].

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::logutil::escape_log;
use crate::progression::challenge::{create_next_challenge, Challenge, ChallengeCatalog};
use crate::progression::errors::ProgressionError;
use crate::progression::level::{level_info, LevelInfo};
use crate::progression::state::{InitReport, ProgressionState};
use crate::progression::types::{Configuration, Event};

/// Outbound notification produced while recording an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressionNotice {
    /// Total XP grew by `gained`.
    XpChanged { gained: u64, level: LevelInfo },
    /// The derived level changed.
    LevelUp { previous_level: u32, level: LevelInfo },
    /// An active challenge advanced without completing.
    ChallengeProgressed { event: Event, challenge: Challenge },
    /// `completed` was archived and `next` installed in its place.
    ChallengeCompleted {
        event: Event,
        completed: Challenge,
        next: Challenge,
    },
}

/// Subscriber for engine notices. Implementations must not assume any other
/// listener exists.
pub trait ProgressionListener: Send {
    fn on_notice(&mut self, notice: &ProgressionNotice);
}

impl<F> ProgressionListener for F
where
    F: FnMut(&ProgressionNotice) + Send,
{
    fn on_notice(&mut self, notice: &ProgressionNotice) {
        self(notice)
    }
}

pub struct ProgressionEngine {
    state: ProgressionState,
    catalog: ChallengeCatalog,
    listeners: Vec<Box<dyn ProgressionListener>>,
}

impl ProgressionEngine {
    /// Engine over `state` using the standard challenge catalog. Call
    /// [`ProgressionEngine::initialize`] before recording events.
    pub fn new(state: ProgressionState) -> Self {
        Self::with_catalog(state, ChallengeCatalog::standard())
    }

    pub fn with_catalog(state: ProgressionState, catalog: ChallengeCatalog) -> Self {
        Self {
            state,
            catalog,
            listeners: Vec::new(),
        }
    }

    /// Fresh state, already initialized.
    pub fn fresh() -> Self {
        let mut engine = Self::new(ProgressionState::new());
        engine.initialize();
        engine
    }

    /// Idempotent; run after every load.
    pub fn initialize(&mut self) -> InitReport {
        let report = self.state.initialize(&self.catalog);
        if report.first_run {
            info!("First run: progression state created");
        }
        report
    }

    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: ProgressionListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn into_state(self) -> ProgressionState {
        self.state
    }

    pub fn catalog(&self) -> &ChallengeCatalog {
        &self.catalog
    }

    pub fn level_info(&self) -> LevelInfo {
        self.state.level_info()
    }

    /// Count the event, award its base XP and advance its challenge.
    /// Returns every notice emitted, in emission order.
    pub fn record_event(&mut self, event: Event) -> Vec<ProgressionNotice> {
        let mut notices = Vec::new();

        let count = self.state.event_counts.entry(event).or_insert(0);
        *count = count.saturating_add(1);
        debug!("Recorded {} (count {})", event, count);

        self.award_xp(event.base_xp(), &mut notices);
        self.advance_into(event, &mut notices);

        self.dispatch(&notices);
        notices
    }

    /// Like [`ProgressionEngine::record_event`] for raw keys from a front end.
    /// Unknown keys are rejected rather than coerced, so statistics never
    /// absorb a misspelled event. The `none` sentinel is not an inbound event.
    pub fn record_event_key(&mut self, key: &str) -> Result<Vec<ProgressionNotice>, ProgressionError> {
        match key.parse::<Event>() {
            Ok(Event::None) => {
                warn!("Rejected sentinel event key '{}'", escape_log(key));
                Err(ProgressionError::UnknownEvent(key.to_string()))
            }
            Ok(event) => Ok(self.record_event(event)),
            Err(e) => {
                warn!("Rejected unknown event key '{}'", escape_log(key));
                Err(e)
            }
        }
    }

    /// Add one to the active challenge for `event`, completing and replacing
    /// it when the goal is reached. Events without a challenge are ignored.
    pub fn advance_challenge(&mut self, event: Event) -> Vec<ProgressionNotice> {
        let mut notices = Vec::new();
        self.advance_into(event, &mut notices);
        self.dispatch(&notices);
        notices
    }

    pub fn set_nickname(&mut self, nickname: &str) {
        self.state.set_nickname(nickname);
    }

    pub fn set_show_completed_challenges(&mut self, show: bool) {
        self.state.set_show_completed_challenges(show);
    }

    pub fn set_configuration(&mut self, configuration: Configuration) {
        self.state.set_configuration(configuration);
    }

    fn advance_into(&mut self, event: Event, notices: &mut Vec<ProgressionNotice>) {
        let Some(challenge) = self.state.active_challenges.get_mut(&event) else {
            return;
        };
        challenge.progress = challenge.progress.saturating_add(1);

        if !challenge.is_completed() {
            notices.push(ProgressionNotice::ChallengeProgressed {
                event,
                challenge: challenge.clone(),
            });
            return;
        }

        let next = create_next_challenge(challenge);
        let Some(mut completed) = self.state.active_challenges.insert(event, next.clone()) else {
            return;
        };
        completed.mark_completed();
        let reward = completed.reward_xp;
        self.state.completed_challenges.push(completed.clone());
        info!(
            "Completed '{}' ({}/{}), reward {} XP; next goal {}",
            completed.name, completed.progress, completed.goal, reward, next.goal
        );

        self.award_xp(reward, notices);
        notices.push(ProgressionNotice::ChallengeCompleted {
            event,
            completed,
            next,
        });
    }

    fn award_xp(&mut self, amount: u64, notices: &mut Vec<ProgressionNotice>) {
        let before = level_info(self.state.total_xp);
        self.state.total_xp = self.state.total_xp.saturating_add(amount);
        let after = level_info(self.state.total_xp);

        if amount > 0 {
            notices.push(ProgressionNotice::XpChanged {
                gained: amount,
                level: after,
            });
        }
        if after.level != before.level {
            info!("Level up: {} -> {}", before.level, after.level);
            notices.push(ProgressionNotice::LevelUp {
                previous_level: before.level,
                level: after,
            });
        }
    }

    fn dispatch(&mut self, notices: &[ProgressionNotice]) {
        for notice in notices {
            for listener in self.listeners.iter_mut() {
                listener.on_notice(notice);
            }
        }
    }
}

/// Cloneable handle that serializes access to one engine across threads.
#[derive(Clone)]
pub struct SharedProgression {
    inner: Arc<Mutex<ProgressionEngine>>,
}

impl SharedProgression {
    pub fn new(engine: ProgressionEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ProgressionEngine>, ProgressionError> {
        self.inner
            .lock()
            .map_err(|_| ProgressionError::Internal("progression engine lock poisoned".to_string()))
    }

    pub fn record_event(&self, event: Event) -> Result<Vec<ProgressionNotice>, ProgressionError> {
        Ok(self.lock()?.record_event(event))
    }

    pub fn record_event_key(&self, key: &str) -> Result<Vec<ProgressionNotice>, ProgressionError> {
        self.lock()?.record_event_key(key)
    }

    pub fn subscribe<L>(&self, listener: L) -> Result<(), ProgressionError>
    where
        L: ProgressionListener + 'static,
    {
        self.lock()?.subscribe(listener);
        Ok(())
    }

    /// Consistent copy of the state between two recorded events.
    pub fn snapshot(&self) -> Result<ProgressionState, ProgressionError> {
        Ok(self.lock()?.state().clone())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(
        &self,
        f: impl FnOnce(&mut ProgressionEngine) -> R,
    ) -> Result<R, ProgressionError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}
