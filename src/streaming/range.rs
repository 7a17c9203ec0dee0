//! HTTP `Range` header parsing.
//!
//! Only the single-range `bytes=START-[END]` form is accepted. Multi-range
//! and suffix (`bytes=-N`) requests are rejected; an absent header is not an
//! error and is handled by the caller.

use crate::{Error, Result};

/// A parsed `Range` header: a required start offset and an optional
/// inclusive end offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: Option<u64>,
}

/// Parse a `Range: bytes=START-[END]` header value.
///
/// The total asset length is deliberately not consulted here; bounds
/// checking against the asset is the planner's job.
pub fn parse_range_header(value: &str) -> Result<RangeSpec> {
    let spec = value
        .strip_prefix("bytes=")
        .ok_or_else(|| Error::MalformedRange(format!("unsupported range unit in {value:?}")))?;

    if spec.contains(',') {
        return Err(Error::MalformedRange(
            "multiple ranges are not supported".into(),
        ));
    }

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| Error::MalformedRange(format!("missing '-' in {value:?}")))?;
    let start_str = start_str.trim();
    let end_str = end_str.trim();

    if start_str.is_empty() {
        return Err(Error::MalformedRange(
            "suffix ranges are not supported".into(),
        ));
    }

    let start: u64 = start_str
        .parse()
        .map_err(|_| Error::MalformedRange(format!("invalid start offset {start_str:?}")))?;

    let end: Option<u64> = if end_str.is_empty() {
        None
    } else {
        let end = end_str
            .parse()
            .map_err(|_| Error::MalformedRange(format!("invalid end offset {end_str:?}")))?;
        if end < start {
            return Err(Error::MalformedRange(format!(
                "end {end} is before start {start}"
            )));
        }
        Some(end)
    };

    Ok(RangeSpec { start, end })
}
