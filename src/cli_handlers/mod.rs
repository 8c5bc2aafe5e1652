// CLI command handlers module
//
// Serve lives in crate::server; this module holds the offline commands that
// inspect the registry files without touching the broker.

pub mod listing;

pub use listing::{handle_clients_command, handle_rooms_command};
