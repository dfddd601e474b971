//! Session events and stored history records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownAction;

/// A session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// User entered the shared space
    Enter,
    /// User quit the shared space
    Quit,
}

impl Action {
    /// Every valid action, in declaration order
    pub const ALL: [Action; 2] = [Action::Enter, Action::Quit];

    /// Wire and storage spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Enter => "enter",
            Action::Quit => "quit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    // Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enter" => Ok(Action::Enter),
            "quit" => Ok(Action::Quit),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Identifier assigned by the history store at append time
///
/// Ids start at 1 and strictly increase in commit order. They are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

impl EventId {
    /// Wrap a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded client event that has not been stored yet
///
/// The action is kept as the raw string the client sent. Only the store
/// turns it into an [`Action`], so an out-of-range value travels this far
/// and is rejected at the storage boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Subject of the event
    pub user_id: i64,
    /// Raw action string
    pub action: String,
    /// Client-supplied instant, not checked against wall-clock time
    pub timestamp: f64,
}

impl SessionEvent {
    /// Create a new pending event
    pub fn new(user_id: i64, action: impl Into<String>, timestamp: f64) -> Self {
        Self {
            user_id,
            action: action.into(),
            timestamp,
        }
    }
}

/// A row of the history log
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub user_id: i64,
    pub action: Action,
    pub timestamp: f64,
}
