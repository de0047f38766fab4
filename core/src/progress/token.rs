use std::fmt;

use crate::error::ProgressError;

/// Trailing `i/total` counter of a status line such as `"Retrieving sensors (3/10)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterToken {
    pub index: u64,
    pub total: u64,
}

impl fmt::Display for CounterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

/// Parse the last whitespace-separated token of `status`, with or without parens.
pub fn parse_counter_token(status: &str) -> Result<CounterToken, ProgressError> {
    let malformed = || ProgressError::MalformedUpstreamState(format!("no counter in '{status}'"));

    let token = status.split_whitespace().last().ok_or_else(malformed)?;
    let token = token.trim_start_matches('(').trim_end_matches(')');
    let (index, total) = token.split_once('/').ok_or_else(malformed)?;

    let index = index.parse::<u64>().map_err(|_| malformed())?;
    let total = total.parse::<u64>().map_err(|_| malformed())?;
    Ok(CounterToken { index, total })
}
