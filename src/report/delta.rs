use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::types::ParsedRecord;

/// Change in agreement count against the previous snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Delta {
    Increased(u32),
    Decreased(u32),
    Unchanged,
    NoBaseline,
}

impl Delta {
    pub fn between(previous: Option<&ParsedRecord>, current: &ParsedRecord) -> Self {
        let Some(previous) = previous else {
            return Self::NoBaseline;
        };
        let (before, after) = (previous.current_count, current.current_count);
        if after > before {
            Self::Increased(after - before)
        } else if after < before {
            Self::Decreased(before - after)
        } else {
            Self::Unchanged
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Increased(_) | Self::Decreased(_))
    }

    /// Signed value, zero for no change or no baseline.
    pub fn signed(&self) -> i64 {
        match self {
            Self::Increased(n) => i64::from(*n),
            Self::Decreased(n) => -i64::from(*n),
            Self::Unchanged | Self::NoBaseline => 0,
        }
    }
}

/// `+N` / `-N` for a change, empty otherwise.
impl Display for Delta {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increased(n) => write!(f, "+{n}"),
            Self::Decreased(n) => write!(f, "-{n}"),
            Self::Unchanged | Self::NoBaseline => Ok(()),
        }
    }
}
