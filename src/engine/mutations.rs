use chrono::Utc;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;
use crate::store::StoreError;

use super::availability::validate_stay;
use super::pricing::quote;
use super::{Engine, EngineError};

fn store_fault(err: StoreError) -> EngineError {
    match err {
        StoreError::NotFound(id) => EngineError::BookingNotFound(id),
        StoreError::AlreadyExists(id) => EngineError::Conflict(id),
        StoreError::Overlap { conflicting, .. } => EngineError::Conflict(conflicting),
    }
}

impl Engine {
    /// Book a room. The availability check and the insert run under the
    /// room lock, so concurrent creates for an overlapping range resolve to
    /// exactly one winner; the losers get `Unavailable` and write nothing.
    pub async fn create_booking(&self, req: CreateBooking) -> Result<Booking, EngineError> {
        let stay = validate_stay(req.check_in, req.check_out)?;
        if req.guest_count < 1 {
            return Err(EngineError::Validation("guest count must be at least 1"));
        }
        if let Some(ref sr) = req.special_requests
            && sr.len() > MAX_SPECIAL_REQUESTS_LEN
        {
            return Err(EngineError::LimitExceeded("special requests too long"));
        }
        let room = self.require_room(req.room_id).await?;
        if req.guest_count > room.capacity {
            return Err(EngineError::Validation("guest count exceeds room capacity"));
        }

        let _guard = self.lock_rooms(vec![room.id]).await;

        let conflicts = self.conflicts_for(room.id, &stay, None).await?;
        if !conflicts.is_empty() {
            metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Unavailable {
                room_id: room.id,
                conflicting: conflicts.into_iter().map(|b| b.id).collect(),
            });
        }

        let now = Utc::now();
        let booking = Booking {
            id: Ulid::new(),
            room_id: room.id,
            guest_id: req.guest_id,
            start_date: stay.check_in,
            end_date: stay.check_out,
            guest_count: req.guest_count,
            total_price: quote(room.nightly_rate, &stay),
            status: BookingStatus::Pending,
            special_requests: req.special_requests,
            created_at: now,
            updated_at: now,
        };

        let booking = self.insert_with_retry(booking).await?;
        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        tracing::info!(booking = %booking.id, room = %booking.room_id, "booking created");
        Ok(booking)
    }

    /// Apply a field-level patch. Reschedules (room or date changes) with a
    /// still-blocking result re-run the availability check excluding this
    /// booking, and recompute the price unless the patch carries an
    /// explicit `total_price`. Status values are applied as given; the
    /// state machine is caller-driven.
    pub async fn update_booking(
        &self,
        id: BookingId,
        patch: BookingPatch,
    ) -> Result<Booking, EngineError> {
        if let Some(ref sr) = patch.special_requests
            && sr.len() > MAX_SPECIAL_REQUESTS_LEN
        {
            return Err(EngineError::LimitExceeded("special requests too long"));
        }
        if let Some(price) = patch.total_price
            && price < 0.0
        {
            return Err(EngineError::Validation("total price must be non-negative"));
        }

        let (_guards, current) = self.resolve_booking_write(id, patch.room_id).await?;

        let mut updated = current;
        if let Some(rid) = patch.room_id {
            updated.room_id = rid;
        }
        if let Some(d) = patch.start_date {
            updated.start_date = d;
        }
        if let Some(d) = patch.end_date {
            updated.end_date = d;
        }
        if let Some(n) = patch.guest_count {
            updated.guest_count = n;
        }
        if let Some(s) = patch.status {
            updated.status = s;
        }
        if let Some(ref sr) = patch.special_requests {
            updated.special_requests = Some(sr.clone());
        }

        let stay = validate_stay(updated.start_date, updated.end_date)?;
        if updated.guest_count < 1 {
            return Err(EngineError::Validation("guest count must be at least 1"));
        }
        let room = self.require_room(updated.room_id).await?;
        if updated.guest_count > room.capacity {
            return Err(EngineError::Validation("guest count exceeds room capacity"));
        }

        if patch.reschedules() && updated.status.is_blocking() {
            let conflicts = self.conflicts_for(updated.room_id, &stay, Some(id)).await?;
            if !conflicts.is_empty() {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                return Err(EngineError::Unavailable {
                    room_id: updated.room_id,
                    conflicting: conflicts.into_iter().map(|b| b.id).collect(),
                });
            }
        }

        if let Some(price) = patch.total_price {
            updated.total_price = price;
        } else if patch.reschedules() {
            updated.total_price = quote(room.nightly_rate, &stay);
        }
        updated.updated_at = Utc::now();

        let saved = self.update_with_retry(updated).await?;
        tracing::debug!(booking = %saved.id, room = %saved.room_id, "booking updated");
        Ok(saved)
    }

    /// Soft delete: moves to Cancelled, which frees the range immediately.
    pub async fn cancel_booking(&self, id: BookingId) -> Result<Booking, EngineError> {
        let patch = BookingPatch {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        let booking = self.update_booking(id, patch).await?;
        metrics::counter!(observability::BOOKINGS_CANCELLED_TOTAL).increment(1);
        tracing::info!(booking = %booking.id, room = %booking.room_id, "booking cancelled");
        Ok(booking)
    }

    /// Hard delete. Deleting an absent booking reports `false`, not an
    /// error.
    pub async fn delete_booking(&self, id: BookingId) -> bool {
        let removed = self.store.delete(id).await;
        if removed {
            metrics::counter!(observability::BOOKINGS_DELETED_TOTAL).increment(1);
            tracing::info!(booking = %id, "booking deleted");
        }
        removed
    }

    /// Persist a new booking, absorbing one store-level overlap refusal by
    /// re-checking availability and retrying. A second refusal means a
    /// writer outside the engine holds the range.
    async fn insert_with_retry(&self, booking: Booking) -> Result<Booking, EngineError> {
        match self.store.insert(booking.clone()).await {
            Ok(()) => Ok(booking),
            Err(StoreError::Overlap { .. }) => {
                metrics::counter!(observability::STORE_CONFLICT_RETRIES_TOTAL).increment(1);
                tracing::debug!(booking = %booking.id, "store overlap on insert, re-checking");
                let stay = booking.stay();
                let conflicts = self
                    .conflicts_for(booking.room_id, &stay, Some(booking.id))
                    .await?;
                if !conflicts.is_empty() {
                    metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                    return Err(EngineError::Unavailable {
                        room_id: booking.room_id,
                        conflicting: conflicts.into_iter().map(|b| b.id).collect(),
                    });
                }
                match self.store.insert(booking.clone()).await {
                    Ok(()) => Ok(booking),
                    Err(e) => Err(store_fault(e)),
                }
            }
            Err(e) => Err(store_fault(e)),
        }
    }

    async fn update_with_retry(&self, booking: Booking) -> Result<Booking, EngineError> {
        match self.store.update(booking.clone()).await {
            Ok(saved) => Ok(saved),
            Err(StoreError::Overlap { .. }) => {
                metrics::counter!(observability::STORE_CONFLICT_RETRIES_TOTAL).increment(1);
                tracing::debug!(booking = %booking.id, "store overlap on update, re-checking");
                let stay = booking.stay();
                let conflicts = self
                    .conflicts_for(booking.room_id, &stay, Some(booking.id))
                    .await?;
                if !conflicts.is_empty() {
                    metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                    return Err(EngineError::Unavailable {
                        room_id: booking.room_id,
                        conflicting: conflicts.into_iter().map(|b| b.id).collect(),
                    });
                }
                match self.store.update(booking).await {
                    Ok(saved) => Ok(saved),
                    Err(e) => Err(store_fault(e)),
                }
            }
            Err(e) => Err(store_fault(e)),
        }
    }
}
