mod availability;
mod error;
mod mutations;
mod pricing;

pub use availability::conflicting;
pub use error::EngineError;
pub use pricing::{nights, quote};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::*;
use crate::rooms::RoomDirectory;
use crate::store::BookingStore;

/// The booking lifecycle manager. Rooms and bookings live behind the
/// injected collaborators; the engine owns the one invariant that matters:
/// no two blocking bookings on a room may overlap.
///
/// The invariant is protected by a per-room lock held across every
/// check-then-write window, so two concurrent creates for the same range
/// resolve to exactly one winner.
pub struct Engine {
    rooms: Arc<dyn RoomDirectory>,
    store: Arc<dyn BookingStore>,
    room_locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(rooms: Arc<dyn RoomDirectory>, store: Arc<dyn BookingStore>) -> Self {
        Self {
            rooms,
            store,
            room_locks: DashMap::new(),
        }
    }

    fn room_lock(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        self.room_locks.entry(room_id).or_default().clone()
    }

    /// Acquire write locks for a set of rooms in sorted order to prevent
    /// deadlocks between concurrent cross-room reschedules.
    async fn lock_rooms(&self, mut ids: Vec<RoomId>) -> Vec<OwnedMutexGuard<()>> {
        ids.sort();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.room_lock(id).lock_owned().await);
        }
        guards
    }

    /// Look up the booking, lock its room plus the patch's target room,
    /// then re-read under the locks. Retakes the locks if the booking moved
    /// rooms between the unlocked peek and the acquisition.
    async fn resolve_booking_write(
        &self,
        id: BookingId,
        target_room: Option<RoomId>,
    ) -> Result<(Vec<OwnedMutexGuard<()>>, Booking), EngineError> {
        loop {
            let peek = self
                .store
                .find_by_id(id)
                .await
                .ok_or(EngineError::BookingNotFound(id))?;
            let mut rooms = vec![peek.room_id];
            if let Some(rid) = target_room {
                rooms.push(rid);
            }
            let guards = self.lock_rooms(rooms).await;
            let current = self
                .store
                .find_by_id(id)
                .await
                .ok_or(EngineError::BookingNotFound(id))?;
            if current.room_id == peek.room_id {
                return Ok((guards, current));
            }
        }
    }

    async fn require_room(&self, id: RoomId) -> Result<Room, EngineError> {
        self.rooms
            .get_room(id)
            .await
            .ok_or(EngineError::RoomNotFound(id))
    }

    // ── Read surface ─────────────────────────────────────────

    pub async fn get_booking(&self, id: BookingId) -> Option<Booking> {
        self.store.find_by_id(id).await
    }

    pub async fn list_bookings(&self, filter: &BookingFilter) -> Vec<Booking> {
        self.store.find_all(filter).await
    }

    pub async fn bookings_for_guest(&self, guest_id: GuestId) -> Vec<Booking> {
        self.store.find_by_guest(guest_id).await
    }

    pub async fn bookings_for_room(&self, room_id: RoomId) -> Vec<Booking> {
        self.store.find_by_room(room_id, None).await
    }
}
