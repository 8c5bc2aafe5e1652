//! JSON-file backed registry store.
//!
//! `clients.json` maps uuid to `{"roomname", "clientname"}`; `rooms.json` is
//! an array of room names. Both files may be edited by hand while the server
//! runs, so every operation re-reads from disk. Rewrites keep entries, and the
//! fields inside them, in file order. Writes go through a temp file and a
//! rename, and all client-file access is serialized by one async mutex,
//! which makes `upsert_if_absent` atomic for this process.

use super::{ClientRecord, RegistryStore};
use crate::error::{Result, SignageError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// The fields of one client entry the server reads
#[derive(Debug, Default, Deserialize)]
struct StoredClient {
    roomname: Option<String>,
    clientname: Option<String>,
}

/// uuid to entry, in file order
type ClientsFile = Map<String, Value>;

fn to_record(uuid: &str, entry: &Value) -> Option<ClientRecord> {
    let stored = StoredClient::deserialize(entry).ok()?;
    match (stored.roomname, stored.clientname) {
        (Some(room), Some(name)) if !room.is_empty() && !name.is_empty() => Some(ClientRecord {
            uuid: uuid.to_string(),
            room_name: room,
            client_name: name,
        }),
        _ => None,
    }
}

pub struct JsonFileStore {
    clients_path: PathBuf,
    rooms_path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(clients_path: impl Into<PathBuf>, rooms_path: impl Into<PathBuf>) -> Self {
        Self {
            clients_path: clients_path.into(),
            rooms_path: rooms_path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_clients(&self) -> Result<ClientsFile> {
        let content = match tokio::fs::read_to_string(&self.clients_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ClientsFile::new()),
            Err(e) => {
                return Err(SignageError::RegistryStore(format!(
                    "failed to read {}: {}",
                    self.clients_path.display(),
                    e
                )))
            },
        };

        if content.trim().is_empty() {
            return Ok(ClientsFile::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            SignageError::RegistryStore(format!(
                "failed to parse {}: {}",
                self.clients_path.display(),
                e
            ))
        })
    }

    async fn write_clients(&self, clients: &ClientsFile) -> Result<()> {
        let content = serde_json::to_string_pretty(clients)?;
        let tmp_path = self.clients_path.with_extension("json.tmp");

        if let Some(parent) = self.clients_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SignageError::RegistryStore(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        tokio::fs::write(&tmp_path, content).await.map_err(|e| {
            SignageError::RegistryStore(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.clients_path)
            .await
            .map_err(|e| {
                SignageError::RegistryStore(format!(
                    "failed to replace {}: {}",
                    self.clients_path.display(),
                    e
                ))
            })
    }
}

impl RegistryStore for JsonFileStore {
    async fn get(&self, uuid: &str) -> Result<Option<ClientRecord>> {
        let _guard = self.lock.lock().await;
        let clients = self.read_clients().await?;
        Ok(clients.get(uuid).and_then(|entry| to_record(uuid, entry)))
    }

    async fn upsert_if_absent(&self, record: ClientRecord) -> Result<ClientRecord> {
        let _guard = self.lock.lock().await;
        let mut clients = self.read_clients().await?;

        if let Some(existing) = clients
            .get(&record.uuid)
            .and_then(|entry| to_record(&record.uuid, entry))
        {
            return Ok(existing);
        }

        // New uuids append; incomplete entries are filled in place
        let entry = clients
            .entry(record.uuid.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert("roomname".into(), Value::String(record.room_name.clone()));
            fields.insert("clientname".into(), Value::String(record.client_name.clone()));
        }

        self.write_clients(&clients).await?;
        Ok(record)
    }

    async fn list_known_rooms(&self) -> Result<Vec<String>> {
        let content = match tokio::fs::read_to_string(&self.rooms_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.rooms_path.display(),
                    "Rooms file does not exist, no timers will be available"
                );
                return Ok(Vec::new());
            },
            Err(e) => {
                return Err(SignageError::RegistryStore(format!(
                    "failed to read {}: {}",
                    self.rooms_path.display(),
                    e
                )))
            },
        };

        let rooms: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            SignageError::RegistryStore(format!(
                "failed to parse {}: {}",
                self.rooms_path.display(),
                e
            ))
        })?;

        let mut known = Vec::with_capacity(rooms.len());
        for room in rooms {
            if room.is_empty() || room.contains(['/', '+', '#']) {
                tracing::warn!(room = %room, "Skipping room name that is not a topic segment");
                continue;
            }
            if !known.contains(&room) {
                known.push(room);
            }
        }
        Ok(known)
    }

    async fn list(&self) -> Result<Vec<ClientRecord>> {
        let _guard = self.lock.lock().await;
        let clients = self.read_clients().await?;
        let mut records: Vec<ClientRecord> = clients
            .iter()
            .filter_map(|(uuid, entry)| to_record(uuid, entry))
            .collect();
        records.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(records)
    }
}
