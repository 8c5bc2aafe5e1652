//! Room countdown timers.
//!
//! Each room is an actor task (see [`room`]) spawned at bootstrap by the
//! [`TimerRegistry`]. [`TimerEngine`] is the entry point the dispatcher uses:
//! it resolves the room and waits for the actor to apply the command, so a
//! command has taken effect by the time the call returns.

pub mod registry;
pub mod room;
pub mod state;

pub use registry::TimerRegistry;
pub use room::RoomCommand;
pub use state::TimerSnapshot;

use crate::error::Result;
use crate::message::ControlAction;
use crate::publisher::Publisher;

pub struct TimerEngine {
    registry: TimerRegistry,
}

impl TimerEngine {
    pub fn new<I>(rooms: I, publisher: &Publisher) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            registry: TimerRegistry::bootstrap(rooms, publisher),
        }
    }

    pub fn registry(&self) -> &TimerRegistry {
        &self.registry
    }

    pub async fn set_seconds(&self, room: &str, value: u64) -> Result<TimerSnapshot> {
        self.apply(room, RoomCommand::SetSeconds(value)).await
    }

    pub async fn control(&self, room: &str, action: ControlAction) -> Result<TimerSnapshot> {
        self.apply(room, RoomCommand::Control(action)).await
    }

    #[cfg(test)]
    pub async fn snapshot(&self, room: &str) -> Result<TimerSnapshot> {
        self.apply(room, RoomCommand::Snapshot).await
    }

    async fn apply(&self, room: &str, command: RoomCommand) -> Result<TimerSnapshot> {
        self.registry.get(room)?.send(command).await
    }
}
