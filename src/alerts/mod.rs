//! SQL injection alerting
//!
//! Turns the rows of the stored script into a digest and posts it to the
//! alert channel on a fixed interval.

pub mod formatter;
pub mod poller;

pub use formatter::{format_digest, Finding};
pub use poller::{CycleOutcome, PollError, Poller, POLL_INTERVAL, RESULT_TABLE};
