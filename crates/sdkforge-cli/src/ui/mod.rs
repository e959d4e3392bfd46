//! Console rendering of engine progress.

pub mod output;

pub use output::{reporter_for, ConsoleReporter, JsonReporter};
