//! Editor positions: 1-based as users say them, 0-based as the editor addresses them

use serde::{Deserialize, Serialize};

/// A 1-based (line, column) pair as supplied by a user or the model
///
/// Values are not trusted: zero or negative numbers are allowed here and
/// clamped on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorPosition {
    pub line: i64,
    pub column: i64,
}

/// A 0-based position in the editor's own addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ZeroBasedPosition {
    pub line: u32,
    pub character: u32,
}

impl EditorPosition {
    pub fn new(line: i64, column: i64) -> Self {
        Self { line, column }
    }

    /// Shift to 0-based and floor at the first addressable line/column
    pub fn to_zero_based(self) -> ZeroBasedPosition {
        ZeroBasedPosition {
            line: to_index(self.line),
            character: to_index(self.column),
        }
    }
}

fn to_index(one_based: i64) -> u32 {
    one_based.saturating_sub(1).clamp(0, i64::from(u32::MAX)) as u32
}

impl ZeroBasedPosition {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Back to 1-based, for messages
    pub fn to_one_based(self) -> EditorPosition {
        EditorPosition {
            line: i64::from(self.line) + 1,
            column: i64::from(self.character) + 1,
        }
    }
}
