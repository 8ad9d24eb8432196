use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, used for duration math and input caps.
pub type Ms = i64;

pub type RoomId = Ulid;
pub type GuestId = Ulid;
pub type BookingId = Ulid;

/// Half-open stay window `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl Stay {
    /// `check_in < check_out` is enforced at the engine boundary, not here:
    /// stays are also rebuilt from store records, and a malformed record
    /// must not panic the read path. An inverted stay overlaps nothing.
    pub fn new(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Self {
        Self { check_in, check_out }
    }

    pub fn duration_ms(&self) -> Ms {
        (self.check_out - self.check_in).num_milliseconds()
    }

    /// Two stays overlap iff `s1 < e2 && s2 < e1`. One stay ending the
    /// instant another starts is not an overlap.
    pub fn overlaps(&self, other: &Stay) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

/// Booking state machine: Pending → Confirmed → Completed, with
/// Pending/Confirmed → Cancelled. Transitions are caller-driven updates;
/// no transition value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its room's dates.
    /// Completed stays keep blocking: a closed historical stay must not be
    /// double-booked retroactively. Only cancellation frees the range.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomCategory {
    Standard,
    Deluxe,
    Suite,
    Presidential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A room record as served by the directory. Read-only to the engine.
///
/// `is_available` is an administrative flag managed by the directory,
/// independent of date-based availability; the engine does not consult it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub category: RoomCategory,
    pub nightly_rate: f64,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub room_id: RoomId,
    pub guest_id: GuestId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub guest_count: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> Stay {
        Stay::new(self.start_date, self.end_date)
    }

    pub fn blocks(&self) -> bool {
        self.status.is_blocking()
    }
}

/// Request payload for `Engine::create_booking`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub room_id: RoomId,
    pub guest_id: GuestId,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guest_count: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Field-level patch for `Engine::update_booking`. `None` leaves the field
/// untouched. `total_price` is an explicit caller override; when absent the
/// engine recomputes the price whenever the room or dates change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    pub room_id: Option<RoomId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub guest_count: Option<u32>,
    pub status: Option<BookingStatus>,
    pub special_requests: Option<String>,
    pub total_price: Option<f64>,
}

impl BookingPatch {
    /// True when the patch moves the booking in space or time.
    pub fn reschedules(&self) -> bool {
        self.room_id.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Filter for `Engine::list_bookings`. All present fields must match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFilter {
    pub room_id: Option<RoomId>,
    pub guest_id: Option<GuestId>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.room_id.is_none_or(|r| r == booking.room_id)
            && self.guest_id.is_none_or(|g| g == booking.guest_id)
            && self.status.is_none_or(|s| s == booking.status)
    }
}
