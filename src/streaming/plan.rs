//! Chunk planning: turning a parsed range into concrete byte bounds and the
//! `206 Partial Content` header values that describe them.

use crate::streaming::range::RangeSpec;
use crate::{Error, Result};

/// The concrete byte interval served for one request.
///
/// Both offsets are inclusive. Media responses are always `206`; this server
/// never serves a full-entity `200` body, so a missing `Range` header plans
/// the default first chunk instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub start: u64,
    pub end: u64,
    /// Total asset length when known; `None` renders as `*` in
    /// `Content-Range`.
    pub total_length: Option<u64>,
}

impl ChunkPlan {
    /// Plan the interval to serve.
    ///
    /// Pure function of its inputs:
    /// - no range: `[0, chunk_size - 1]`
    /// - start only: `[start, start + chunk_size - 1]`
    /// - explicit end: used as given
    ///
    /// all clamped to `total_length - 1` when the total is known. A start at
    /// or beyond a known total fails with [`Error::RangeNotSatisfiable`],
    /// which the HTTP layer maps to 416.
    pub fn plan(
        range: Option<RangeSpec>,
        total_length: Option<u64>,
        chunk_size: u64,
    ) -> Result<ChunkPlan> {
        debug_assert!(chunk_size > 0, "chunk_size is validated by config");

        let start = range.map_or(0, |r| r.start);

        if let Some(total) = total_length {
            if start >= total {
                return Err(Error::RangeNotSatisfiable {
                    start,
                    total_length: total,
                });
            }
        }

        let mut end = match range.and_then(|r| r.end) {
            Some(end) => end,
            None => start.saturating_add(chunk_size - 1),
        };
        if let Some(total) = total_length {
            end = end.min(total - 1);
        }

        Ok(ChunkPlan {
            start,
            end,
            total_length,
        })
    }

    /// Number of body bytes described by this plan.
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 0-1048575/5000000`.
    pub fn content_range(&self) -> String {
        match self.total_length {
            Some(total) => format!("bytes {}-{}/{}", self.start, self.end, total),
            None => format!("bytes {}-{}/*", self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn explicit_range_round_trips() {
        let range = RangeSpec {
            start: 100,
            end: Some(199),
        };
        let plan = ChunkPlan::plan(Some(range), Some(1000), MIB).unwrap();
        assert_eq!(plan.start, 100);
        assert_eq!(plan.end, 199);
        assert_eq!(plan.content_length(), 100);
        assert_eq!(plan.content_range(), "bytes 100-199/1000");
    }

    #[test]
    fn no_range_plans_first_chunk() {
        let plan = ChunkPlan::plan(None, Some(5 * MIB), MIB).unwrap();
        assert_eq!(plan.start, 0);
        assert_eq!(plan.end, 1_048_575);
        assert_eq!(plan.content_length(), MIB);
    }

    #[test]
    fn no_range_clamps_to_short_asset() {
        let plan = ChunkPlan::plan(None, Some(1000), MIB).unwrap();
        assert_eq!(plan.end, 999);
        assert_eq!(plan.content_length(), 1000);
    }

    #[test]
    fn start_only_extends_by_chunk_size() {
        let range = RangeSpec {
            start: 2 * MIB,
            end: None,
        };
        let plan = ChunkPlan::plan(Some(range), Some(10 * MIB), MIB).unwrap();
        assert_eq!(plan.start, 2 * MIB);
        assert_eq!(plan.end, 3 * MIB - 1);
    }

    #[test]
    fn end_beyond_total_is_clamped_not_rejected() {
        let range = RangeSpec {
            start: 4_000_000,
            end: Some(9_999_999),
        };
        let plan = ChunkPlan::plan(Some(range), Some(5_000_000), MIB).unwrap();
        assert_eq!(plan.end, 4_999_999);
        assert_eq!(plan.content_range(), "bytes 4000000-4999999/5000000");
    }

    #[test]
    fn start_beyond_total_is_not_satisfiable() {
        let range = RangeSpec {
            start: 6_000_000,
            end: None,
        };
        let err = ChunkPlan::plan(Some(range), Some(5_000_000), MIB).unwrap_err();
        assert_matches!(
            err,
            Error::RangeNotSatisfiable {
                start: 6_000_000,
                total_length: 5_000_000
            }
        );
    }

    #[test]
    fn unknown_total_renders_star() {
        let range = RangeSpec {
            start: 0,
            end: None,
        };
        let plan = ChunkPlan::plan(Some(range), None, MIB).unwrap();
        assert_eq!(plan.content_range(), "bytes 0-1048575/*");
    }

    #[test]
    fn planning_is_idempotent() {
        let range = Some(RangeSpec {
            start: 1234,
            end: Some(5678),
        });
        let a = ChunkPlan::plan(range, Some(10_000), MIB).unwrap();
        let b = ChunkPlan::plan(range, Some(10_000), MIB).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_asset_is_not_satisfiable() {
        let err = ChunkPlan::plan(None, Some(0), MIB).unwrap_err();
        assert_matches!(err, Error::RangeNotSatisfiable { .. });
    }
}
