//! Terminal I/O: prompting for answers and rendering reports.

pub mod prompt;
pub mod report;
