//! `rooms` and `clients` commands: read-only views of the registry files.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::store::{ClientRecord, JsonFileStore, RegistryStore};
use serde_json::json;

fn open_store(config: &ServerConfig) -> JsonFileStore {
    JsonFileStore::new(config.clients_file.clone(), config.rooms_file.clone())
}

pub async fn handle_rooms_command(config: &ServerConfig, format: &str) -> Result<()> {
    let rooms = open_store(config).list_known_rooms().await?;
    println!("{}", render_rooms(&rooms, format)?);
    Ok(())
}

pub async fn handle_clients_command(config: &ServerConfig, format: &str) -> Result<()> {
    let clients = open_store(config).list().await?;
    println!("{}", render_clients(&clients, format)?);
    Ok(())
}

fn render_rooms(rooms: &[String], format: &str) -> Result<String> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&json!({ "rooms": rooms }))?);
    }

    if rooms.is_empty() {
        return Ok("No rooms configured".to_string());
    }
    let mut out = format!("Rooms ({}):", rooms.len());
    for room in rooms {
        out.push_str(&format!("\n  {}", room));
    }
    Ok(out)
}

fn render_clients(clients: &[ClientRecord], format: &str) -> Result<String> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&json!({ "clients": clients }))?);
    }

    if clients.is_empty() {
        return Ok("No clients registered".to_string());
    }
    let uuid_width = clients.iter().map(|c| c.uuid.len()).max().unwrap_or(0);
    let mut out = format!("Clients ({}):", clients.len());
    for client in clients {
        out.push_str(&format!(
            "\n  {:<width$}  {}  ({})",
            client.uuid,
            client.room_name,
            client.client_name,
            width = uuid_width
        ));
    }
    Ok(out)
}
