use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Page or location a retrieved passage came from. The backend decides the shape;
/// most deployments send the zero-based page number, some send a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Number(i64),
    Label(String),
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Number(page) => write!(f, "{page}"),
            PageRef::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for PageRef {
    fn from(value: i64) -> Self {
        PageRef::Number(value)
    }
}

impl From<i32> for PageRef {
    fn from(value: i32) -> Self {
        PageRef::Number(i64::from(value))
    }
}

impl From<&str> for PageRef {
    fn from(value: &str) -> Self {
        PageRef::Label(value.to_string())
    }
}
