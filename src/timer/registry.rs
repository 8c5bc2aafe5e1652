use super::room::RoomHandle;
use crate::error::{Result, SignageError};
use crate::publisher::Publisher;
use std::collections::HashMap;

/// Fixed set of room timers, bootstrapped once from the known rooms.
pub struct TimerRegistry {
    rooms: HashMap<String, RoomHandle>,
    /// Bootstrap order, for listing
    order: Vec<String>,
}

impl TimerRegistry {
    /// Spawn one actor per room. Must be called inside a tokio runtime.
    pub fn bootstrap<I>(rooms: I, publisher: &Publisher) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut registry = Self {
            rooms: HashMap::new(),
            order: Vec::new(),
        };

        for room in rooms {
            let room = room.into();
            if registry.rooms.contains_key(&room) {
                continue;
            }
            let handle = RoomHandle::spawn(room.clone(), publisher.clone());
            registry.rooms.insert(room.clone(), handle);
            registry.order.push(room);
        }

        tracing::info!(rooms = registry.order.len(), "Timer registry bootstrapped");
        registry
    }

    pub fn get(&self, room: &str) -> Result<&RoomHandle> {
        self.rooms
            .get(room)
            .ok_or_else(|| SignageError::UnknownRoom(room.to_string()))
    }

    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
