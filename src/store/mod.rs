//! Registry Store: durable client→room bindings and the list of known rooms.
//!
//! The core only reads records on demand and creates them through
//! [`RegistryStore::upsert_if_absent`]; it never performs read-modify-write
//! itself.

pub mod json_file;

pub use json_file::JsonFileStore;

use crate::error::Result;
use serde::Serialize;
use std::future::Future;

/// Room assigned to clients seen for the first time
pub const DEFAULT_ROOM: &str = "default";

const GENERATED_NAME_PREFIX: &str = "undefinedClient";
const GENERATED_NAME_RANGE: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub uuid: String,
    pub room_name: String,
    pub client_name: String,
}

impl ClientRecord {
    /// Template record for a newly discovered client: default room, generated name.
    pub fn placeholder(uuid: &str) -> Self {
        let suffix = rand::random_range(0..GENERATED_NAME_RANGE);
        Self {
            uuid: uuid.to_string(),
            room_name: DEFAULT_ROOM.to_string(),
            client_name: format!("{}{}", GENERATED_NAME_PREFIX, suffix),
        }
    }
}

/// Durable storage consumed by the discovery handler and the server bootstrap.
///
/// Records missing either the room or the client name count as absent:
/// `get` returns `None` for them and `upsert_if_absent` replaces them.
pub trait RegistryStore: Send + Sync + 'static {
    fn get(&self, uuid: &str) -> impl Future<Output = Result<Option<ClientRecord>>> + Send;

    /// Insert `record` unless a complete record for its uuid exists.
    ///
    /// Returns whichever record is stored afterwards, so a caller that lost a
    /// race gets the winner's record.
    fn upsert_if_absent(
        &self,
        record: ClientRecord,
    ) -> impl Future<Output = Result<ClientRecord>> + Send;

    /// Known room names, in file order
    fn list_known_rooms(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// All complete client records, sorted by uuid
    fn list(&self) -> impl Future<Output = Result<Vec<ClientRecord>>> + Send;
}
