use serde::Serialize;

use crate::error::FetchError;

/// Classified result of one fetch and normalize cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ListOutcome<T> {
    /// Nothing usable came back from the upstream source.
    FetchFailed(String),
    /// The payload was readable but not in the expected shape.
    MalformedResponse(String),
    /// Well formed, zero results.
    Empty,
    Records(Vec<T>),
}

impl<T> ListOutcome<T> {
    pub fn records(&self) -> Option<&[T]> {
        match self {
            ListOutcome::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ListOutcome::FetchFailed(_) | ListOutcome::MalformedResponse(_))
    }
}

impl<T> From<FetchError> for ListOutcome<T> {
    fn from(e: FetchError) -> Self {
        ListOutcome::FetchFailed(e.to_string())
    }
}
