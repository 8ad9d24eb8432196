//! Booking persistence seam.
//!
//! Stores keep full booking records keyed by id. A store must refuse a write
//! that would leave two blocking bookings overlapping on one room, the
//! moral equivalent of a range-exclusion constraint. The engine treats that
//! refusal as a race signal and retries once after a fresh availability
//! check, so the constraint only fires for writers that bypass the engine's
//! per-room locking.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::model::{Booking, BookingFilter, BookingId, GuestId, RoomId};

#[derive(Debug)]
pub enum StoreError {
    NotFound(BookingId),
    AlreadyExists(BookingId),
    /// The write would overlap `conflicting` on the same room.
    Overlap {
        attempted: BookingId,
        conflicting: BookingId,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "booking not found: {id}"),
            StoreError::AlreadyExists(id) => write!(f, "booking already exists: {id}"),
            StoreError::Overlap { attempted, conflicting } => {
                write!(f, "booking {attempted} overlaps existing booking {conflicting}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<(), StoreError>;
    /// Replace the stored record wholesale. Patch application lives in the
    /// engine; the store only re-checks its overlap constraint.
    async fn update(&self, booking: Booking) -> Result<Booking, StoreError>;
    /// Hard delete. Absent id is reported as `false`, not an error.
    async fn delete(&self, id: BookingId) -> bool;
    async fn find_by_id(&self, id: BookingId) -> Option<Booking>;
    /// All bookings on a room, optionally excluding one id (the booking
    /// being updated).
    async fn find_by_room(&self, room_id: RoomId, exclude: Option<BookingId>) -> Vec<Booking>;
    async fn find_by_guest(&self, guest_id: GuestId) -> Vec<Booking>;
    async fn find_all(&self, filter: &BookingFilter) -> Vec<Booking>;
}

/// Dashmap-backed store for single-process hosts and tests.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: DashMap<BookingId, Booking>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    /// First stored blocking booking that would overlap `candidate` on its
    /// room. Cancelled records never participate on either side.
    fn overlap_violation(&self, candidate: &Booking) -> Option<BookingId> {
        if !candidate.blocks() {
            return None;
        }
        let stay = candidate.stay();
        self.bookings
            .iter()
            .find(|e| {
                let b = e.value();
                b.id != candidate.id
                    && b.room_id == candidate.room_id
                    && b.blocks()
                    && b.stay().overlaps(&stay)
            })
            .map(|e| e.value().id)
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        if self.bookings.contains_key(&booking.id) {
            return Err(StoreError::AlreadyExists(booking.id));
        }
        if let Some(conflicting) = self.overlap_violation(&booking) {
            return Err(StoreError::Overlap {
                attempted: booking.id,
                conflicting,
            });
        }
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn update(&self, booking: Booking) -> Result<Booking, StoreError> {
        if !self.bookings.contains_key(&booking.id) {
            return Err(StoreError::NotFound(booking.id));
        }
        if let Some(conflicting) = self.overlap_violation(&booking) {
            return Err(StoreError::Overlap {
                attempted: booking.id,
                conflicting,
            });
        }
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn delete(&self, id: BookingId) -> bool {
        self.bookings.remove(&id).is_some()
    }

    async fn find_by_id(&self, id: BookingId) -> Option<Booking> {
        self.bookings.get(&id).map(|e| e.value().clone())
    }

    async fn find_by_room(&self, room_id: RoomId, exclude: Option<BookingId>) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| e.value().room_id == room_id && exclude != Some(e.value().id))
            .map(|e| e.value().clone())
            .collect()
    }

    async fn find_by_guest(&self, guest_id: GuestId) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| e.value().guest_id == guest_id)
            .map(|e| e.value().clone())
            .collect()
    }

    async fn find_all(&self, filter: &BookingFilter) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookingStatus;
    use chrono::{DateTime, TimeZone, Utc};
    use ulid::Ulid;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn booking(room_id: RoomId, start: u32, end: u32, status: BookingStatus) -> Booking {
        Booking {
            id: Ulid::new(),
            room_id,
            guest_id: Ulid::new(),
            start_date: day(start),
            end_date: day(end),
            guest_count: 1,
            total_price: 100.0,
            status,
            special_requests: None,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    #[tokio::test]
    async fn insert_enforces_room_exclusion() {
        let store = InMemoryBookingStore::new();
        let room = Ulid::new();
        store
            .insert(booking(room, 10, 15, BookingStatus::Pending))
            .await
            .unwrap();

        let clash = booking(room, 12, 13, BookingStatus::Pending);
        let err = store.insert(clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Overlap { .. }));
        assert_eq!(store.booking_count(), 1);
    }

    #[tokio::test]
    async fn exclusion_ignores_cancelled_and_other_rooms() {
        let store = InMemoryBookingStore::new();
        let room = Ulid::new();
        store
            .insert(booking(room, 10, 15, BookingStatus::Cancelled))
            .await
            .unwrap();
        store
            .insert(booking(Ulid::new(), 10, 15, BookingStatus::Confirmed))
            .await
            .unwrap();

        // Same range as the cancelled one — accepted.
        store
            .insert(booking(room, 10, 15, BookingStatus::Pending))
            .await
            .unwrap();
        assert_eq!(store.booking_count(), 3);
    }

    #[tokio::test]
    async fn adjacent_stays_coexist() {
        let store = InMemoryBookingStore::new();
        let room = Ulid::new();
        store
            .insert(booking(room, 10, 15, BookingStatus::Confirmed))
            .await
            .unwrap();
        store
            .insert(booking(room, 15, 20, BookingStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(store.booking_count(), 2);
    }

    #[tokio::test]
    async fn update_excludes_self_from_exclusion() {
        let store = InMemoryBookingStore::new();
        let room = Ulid::new();
        let mut b = booking(room, 10, 15, BookingStatus::Pending);
        store.insert(b.clone()).await.unwrap();

        // Shift within the original range; only conflict candidate is itself.
        b.start_date = day(12);
        b.end_date = day(14);
        store.update(b).await.unwrap();
    }

    #[tokio::test]
    async fn update_absent_is_not_found() {
        let store = InMemoryBookingStore::new();
        let b = booking(Ulid::new(), 10, 15, BookingStatus::Pending);
        assert!(matches!(
            store.update(b).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryBookingStore::new();
        let b = booking(Ulid::new(), 10, 15, BookingStatus::Pending);
        let id = b.id;
        store.insert(b).await.unwrap();
        assert!(store.delete(id).await);
        assert!(!store.delete(id).await);
    }

    #[tokio::test]
    async fn room_query_honors_exclude() {
        let store = InMemoryBookingStore::new();
        let room = Ulid::new();
        let a = booking(room, 10, 12, BookingStatus::Pending);
        let b = booking(room, 20, 22, BookingStatus::Pending);
        let a_id = a.id;
        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();

        assert_eq!(store.find_by_room(room, None).await.len(), 2);
        let rest = store.find_by_room(room, Some(a_id)).await;
        assert_eq!(rest.len(), 1);
        assert_ne!(rest[0].id, a_id);
    }
}
