//! Hard caps applied before any state is touched. Violations surface as
//! `EngineError::LimitExceeded`.

use crate::model::Ms;

/// One night in milliseconds.
pub const MS_PER_NIGHT: Ms = 86_400_000;

/// Earliest accepted instant: 1970-01-01T00:00:00Z.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// Latest accepted instant: 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// Longest single stay: one year.
pub const MAX_STAY_DURATION_MS: Ms = 366 * MS_PER_NIGHT;

pub const MAX_SPECIAL_REQUESTS_LEN: usize = 2_000;
