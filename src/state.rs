//! States of the interactive session.

use crate::data::filter::FilterSpec;
use crate::data::model::{City, RecordStore};

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

/// Where the interactive session currently is.
///
/// ```text
/// CollectingFilters → Loaded → Reporting → Paging → AskRestart
///        ▲                │                            │
///        │                └── load failed ────────────►│
///        └──────────────────── "yes" ◄─────────────────┘──► Done
/// ```
///
/// Each pass through `CollectingFilters` builds a fresh `FilterSpec` and
/// `RecordStore`; nothing is carried over from the previous pass.
#[derive(Debug)]
pub enum SessionState {
    CollectingFilters,
    /// Filters chosen; data not yet read.
    Loaded(FilterSpec),
    Reporting {
        spec: FilterSpec,
        store: RecordStore,
    },
    Paging(City),
    AskRestart,
    Done,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::CollectingFilters => "collecting-filters",
            SessionState::Loaded(_) => "loaded",
            SessionState::Reporting { .. } => "reporting",
            SessionState::Paging(_) => "paging",
            SessionState::AskRestart => "ask-restart",
            SessionState::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SessionState::Done)
    }
}
