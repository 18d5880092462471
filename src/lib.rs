//! Terminal habit tracker. Habits carry a weekly target, completions are stored per day and
//! progress is measured against the target scaled to the current month.
//!

pub mod cli;
pub mod storage;
pub mod tracker;
pub mod utils;
