//! XP and challenge progression.
//! Events earn base XP and advance the matching challenge; completed
//! challenges pay a reward and are replaced by an escalated successor. The
//! level is always derived from total XP.

pub mod challenge;
pub mod display;
pub mod engine;
pub mod errors;
pub mod level;
pub mod state;
pub mod storage;
pub mod types;

pub use challenge::{create_next_challenge, Challenge, ChallengeCatalog, ChallengeTemplate};
pub use display::{
    format_challenge_complete, format_challenge_line, format_dashboard, format_level_up,
    format_notice, format_number_with_commas,
};
pub use engine::{ProgressionEngine, ProgressionListener, ProgressionNotice, SharedProgression};
pub use errors::ProgressionError;
pub use level::{level_info, LevelInfo};
pub use state::{InitReport, ProgressionState, STATE_SCHEMA_VERSION};
pub use storage::{ProgressionStore, ProgressionStoreBuilder};
pub use types::{Configuration, Event, GainedXpPosition};
