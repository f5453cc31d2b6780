pub mod history;
mod source;

pub use history::{History, HistoryError};
pub use source::{LineSource, ReadOutcome};
