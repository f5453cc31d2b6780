use super::{CommandError, REPLAY_INDEX};
use crate::format::Printer;
use crate::input::History;

pub fn list(history: &History, printer: &mut Printer) {
    for (index, command) in history.iter().enumerate() {
        printer.history_entry(index, command);
    }
}

/// Parses `#<n>` into a valid index into a log of `len` entries. The number
/// must make up the whole rest of the token.
pub fn parse_index(token: &str, len: usize) -> Result<usize, CommandError> {
    token
        .strip_prefix(REPLAY_INDEX)
        .and_then(|digits| digits.parse::<i64>().ok())
        .and_then(|index| usize::try_from(index).ok())
        .filter(|&index| index < len)
        .ok_or(CommandError::InvalidIndex)
}

/// Lowest index whose command contains `needle` anywhere. An empty needle
/// matches the first entry.
pub fn find_match(history: &History, needle: &str) -> Option<usize> {
    history.iter().position(|command| command.contains(needle))
}
