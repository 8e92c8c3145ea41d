use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single snapshot fetch. The poller treats every variant as
/// transient.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("snapshot endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("{field} range is empty ({min} > {max})")]
    EmptyRange {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("lane band must lie within 0..=100 percent (got {0})")]
    LaneOutOfBounds(u8),
    #[error("tick period must be non-zero")]
    ZeroTick,
    #[error("initial offset {offset}px must be smaller than the exit margin {margin}px")]
    OffsetNotInsideMargin { offset: u32, margin: u32 },
    #[error("exit margin {margin}px must be wider than the largest fish ({size_max}px)")]
    MarginTooNarrow { margin: u32, size_max: u32 },
}
