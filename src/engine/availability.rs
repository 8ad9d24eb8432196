use chrono::{DateTime, Utc};

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::{Engine, EngineError};

/// Validate a requested `[check_in, check_out)` window and build the stay.
pub(super) fn validate_stay(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<Stay, EngineError> {
    if check_in >= check_out {
        return Err(EngineError::InvalidRange { check_in, check_out });
    }
    if check_in.timestamp_millis() < MIN_VALID_TIMESTAMP_MS
        || check_out.timestamp_millis() > MAX_VALID_TIMESTAMP_MS
    {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    let stay = Stay::new(check_in, check_out);
    if stay.duration_ms() > MAX_STAY_DURATION_MS {
        return Err(EngineError::LimitExceeded("stay too long"));
    }
    Ok(stay)
}

/// Bookings that block `stay`: status still occupies the room and the
/// half-open windows overlap. `exclude` drops the booking being updated
/// from consideration.
pub fn conflicting<'a>(
    bookings: &'a [Booking],
    stay: &Stay,
    exclude: Option<BookingId>,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| exclude != Some(b.id))
        .filter(|b| b.blocks() && b.stay().overlaps(stay))
        .collect()
}

impl Engine {
    /// Pre-flight check: is the room free for `[check_in, check_out)`?
    /// Read-only; the answer can go stale the moment it is returned, so
    /// `create_booking` re-checks under the room lock.
    pub async fn check_availability(
        &self,
        room_id: RoomId,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let stay = validate_stay(check_in, check_out)?;
        metrics::counter!(observability::AVAILABILITY_CHECKS_TOTAL).increment(1);
        Ok(self.conflicts_for(room_id, &stay, None).await?.is_empty())
    }

    /// Which bookings conflict with `stay` on this room.
    pub async fn conflicts_for(
        &self,
        room_id: RoomId,
        stay: &Stay,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, EngineError> {
        self.require_room(room_id).await?;
        let on_room = self.store.find_by_room(room_id, exclude).await;
        Ok(conflicting(&on_room, stay, exclude)
            .into_iter()
            .cloned()
            .collect())
    }
}
