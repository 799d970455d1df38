//! Mapping of lookup responses onto the canonical record shape

use chrono::{Local, NaiveDateTime, SubsecRound};

use crate::types::{LookupCode, NOT_AVAILABLE, RawResult, ResolvedRecord};

/// Turn a lookup outcome into a record stamped with the current local time
///
/// The timestamp is truncated to microseconds, the precision the record store
/// keeps, so a stored record reads back equal to the one returned here.
///
/// Total: an absent result still yields a record, with every descriptive
/// field set to [`NOT_AVAILABLE`] and the code taken from the input.
pub fn normalize(raw: Option<&RawResult>, code: &LookupCode) -> ResolvedRecord {
    normalize_at(raw, code, Local::now().naive_local().trunc_subsecs(6))
}

/// [`normalize`] with an explicit timestamp
pub fn normalize_at(
    raw: Option<&RawResult>,
    code: &LookupCode,
    resolved_at: NaiveDateTime,
) -> ResolvedRecord {
    let or_sentinel = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();

    ResolvedRecord {
        code: raw
            .and_then(RawResult::ifsc)
            .map(LookupCode::from)
            .unwrap_or_else(|| code.clone()),
        bank: or_sentinel(raw.and_then(RawResult::bank)),
        branch: or_sentinel(raw.and_then(RawResult::branch)),
        state: or_sentinel(raw.and_then(RawResult::state)),
        resolved_at,
    }
}
