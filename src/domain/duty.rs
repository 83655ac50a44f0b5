use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DutyId(pub Uuid);

impl DutyId {
    pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for DutyId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for DutyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0.hyphenated(), f) }
}

impl FromStr for DutyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::try_parse(s).map(Self) }
}

/// A single tracked duty as stored and as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Duty {
    pub id: DutyId,
    pub name: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single field an update call is allowed to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DutyChange {
    Rename(String),
    SetCompleted(bool),
}
