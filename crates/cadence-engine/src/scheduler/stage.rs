use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// One of the six ordered per-frame phases.
///
/// Read stages are reserved for work that may force a layout query; write stages for mutation.
/// Three read/write pairs support measure → mutate → re-measure → transform pipelines without
/// querying layout in the middle of a mutation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Stage {
    Read1,
    Write1,
    Read2,
    Write2,
    Read3,
    Write3,
}

impl Stage {
    /// Execution order within a frame.
    pub const ALL: [Stage; 6] = [
        Stage::Read1,
        Stage::Write1,
        Stage::Read2,
        Stage::Write2,
        Stage::Read3,
        Stage::Write3,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_read(self) -> bool {
        matches!(self, Stage::Read1 | Stage::Read2 | Stage::Read3)
    }

    #[inline]
    pub const fn is_write(self) -> bool {
        !self.is_read()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Read1 => "READ_1",
            Stage::Write1 => "WRITE_1",
            Stage::Read2 => "READ_2",
            Stage::Write2 => "WRITE_2",
            Stage::Read3 => "READ_3",
            Stage::Write3 => "WRITE_3",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| EngineError::UnknownStage(s.to_string()))
    }
}
