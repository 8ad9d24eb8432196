use chrono::{DateTime, Utc};

use crate::model::{BookingId, RoomId};

#[derive(Debug)]
pub enum EngineError {
    RoomNotFound(RoomId),
    BookingNotFound(BookingId),
    InvalidRange {
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    },
    Validation(&'static str),
    /// The requested range is taken by the listed bookings.
    Unavailable {
        room_id: RoomId,
        conflicting: Vec<BookingId>,
    },
    /// The store's overlap constraint fired twice in a row: a racing
    /// writer outside the engine won the range.
    Conflict(BookingId),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::RoomNotFound(id) => write!(f, "room not found: {id}"),
            EngineError::BookingNotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::InvalidRange { check_in, check_out } => {
                write!(f, "invalid range: check-in {check_in} must be before check-out {check_out}")
            }
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::Unavailable { room_id, conflicting } => {
                write!(
                    f,
                    "room {room_id} unavailable: conflicts with {} booking(s)",
                    conflicting.len()
                )
            }
            EngineError::Conflict(id) => write!(f, "conflict with booking: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
