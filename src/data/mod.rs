//! Data layer: trip records, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .parquet / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RecordStore
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────┐
//!   │ RecordStore │  Vec<Trip>, derived month / weekday / hour
//!   └─────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  month + day predicates → FilteredView
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
