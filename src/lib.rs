//! Hotel booking core: rooms are booked for half-open date ranges, and no
//! two active bookings for the same room may ever overlap.
//!
//! The crate is the engine only. Room CRUD lives behind [`rooms::RoomDirectory`],
//! persistence behind [`store::BookingStore`]; both are injected into
//! [`engine::Engine`] at construction and their lifecycle belongs to the host.

pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod rooms;
pub mod store;

pub use engine::{Engine, EngineError};
pub use model::{Booking, BookingStatus, Room, Stay};
