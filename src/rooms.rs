//! Room directory seam. The engine only ever reads rooms; who creates and
//! administers them is the host's business.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::model::{Room, RoomCategory, RoomId};

#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn get_room(&self, id: RoomId) -> Option<Room>;
    async fn find_by_number(&self, room_number: &str) -> Option<Room>;
    /// All rooms, optionally narrowed to one category.
    async fn list_rooms(&self, category: Option<RoomCategory>) -> Vec<Room>;
}

/// Dashmap-backed directory for single-process hosts and tests.
#[derive(Default)]
pub struct InMemoryRoomDirectory {
    rooms: DashMap<RoomId, Room>,
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a room record.
    pub fn upsert_room(&self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    pub fn remove_room(&self, id: RoomId) -> bool {
        self.rooms.remove(&id).is_some()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn get_room(&self, id: RoomId) -> Option<Room> {
        self.rooms.get(&id).map(|e| e.value().clone())
    }

    async fn find_by_number(&self, room_number: &str) -> Option<Room> {
        self.rooms
            .iter()
            .find(|e| e.value().room_number == room_number)
            .map(|e| e.value().clone())
    }

    async fn list_rooms(&self, category: Option<RoomCategory>) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|e| category.is_none_or(|c| c == e.value().category))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ulid::Ulid;

    fn room(number: &str, category: RoomCategory) -> Room {
        let now = Utc::now();
        Room {
            id: Ulid::new(),
            room_number: number.into(),
            category,
            nightly_rate: 100.0,
            capacity: 2,
            amenities: Vec::new(),
            is_available: true,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lookup_by_id_and_number() {
        let dir = InMemoryRoomDirectory::new();
        let r = room("101", RoomCategory::Standard);
        let id = r.id;
        dir.upsert_room(r);

        assert_eq!(dir.get_room(id).await.unwrap().room_number, "101");
        assert_eq!(dir.find_by_number("101").await.unwrap().id, id);
        assert!(dir.find_by_number("999").await.is_none());
        assert!(dir.get_room(Ulid::new()).await.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let dir = InMemoryRoomDirectory::new();
        dir.upsert_room(room("101", RoomCategory::Standard));
        dir.upsert_room(room("102", RoomCategory::Standard));
        dir.upsert_room(room("501", RoomCategory::Suite));

        assert_eq!(dir.list_rooms(None).await.len(), 3);
        assert_eq!(dir.list_rooms(Some(RoomCategory::Standard)).await.len(), 2);
        assert_eq!(dir.list_rooms(Some(RoomCategory::Presidential)).await.len(), 0);
    }

    #[tokio::test]
    async fn upsert_replaces_and_remove_reports() {
        let dir = InMemoryRoomDirectory::new();
        let mut r = room("101", RoomCategory::Standard);
        let id = r.id;
        dir.upsert_room(r.clone());

        r.nightly_rate = 250.0;
        dir.upsert_room(r);
        assert_eq!(dir.get_room(id).await.unwrap().nightly_rate, 250.0);

        assert!(dir.remove_room(id));
        assert!(!dir.remove_room(id));
    }
}
