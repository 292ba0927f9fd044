//! # CodeXP - experience points for editor work
//!
//! CodeXP turns everyday editor actions (typing, cut/copy/paste, save, build,
//! run, debug and other commands) into experience points, levels and
//! escalating challenges.
//!
//! ## Features
//!
//! - **Event catalog**: a closed set of events, each worth a fixed amount of XP.
//! - **Level curve**: levels derived from total XP, 300 XP for the first level
//!   and 5% more for every level after it.
//! - **Challenges**: one active challenge per event; completing it pays a reward
//!   and installs a harder one.
//! - **Notices**: XP, level-up and challenge notices delivered to subscribers.
//! - **Persistence**: sled-backed JSON documents keyed by stable event names.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codexp::progression::{Event, ProgressionEngine, ProgressionStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = ProgressionStore::open("./data/codexp")?;
//!     let mut engine = ProgressionEngine::new(store.load_or_default("default")?);
//!     engine.initialize();
//!
//!     for notice in engine.record_event(Event::Save) {
//!         println!("{:?}", notice);
//!     }
//!     store.save_state("default", engine.state())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progression`] - events, level curve, challenges, engine and storage
//! - [`config`] - configuration file loading and defaults
//! - [`logutil`] - helpers for single-line logging of user text

pub mod config;
pub mod logutil;
pub mod progression;
