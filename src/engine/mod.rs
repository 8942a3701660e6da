//! Action loop engine: candidate processing, pacing, reply rendering.

pub mod control;
pub mod reply;

pub use control::{
    ActionLoop, CandidateOutcome, PacingConfig, RunSummary, Selection, ShutdownHandle, select_item,
};
