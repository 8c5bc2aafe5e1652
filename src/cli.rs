use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Signage Server - MQTT coordinator for room signage displays

Keeps one countdown timer per room and onboards displays as they appear
on the bus.

Topics (under the configured namespace, default "ar-signage"):
  devicediscovery               ← clients and dashboards announce themselves
  <room>/timer/setseconds       ← set a room's countdown
  <room>/timer/control          ← START, RESET or PAUSE
  <room>/timer/seconds          → remaining seconds, retained
  client/<uuid>/mediacacheurl   → media cache URL, retained
  client/<uuid>/roomname        → assigned room, retained

Files:
  config.json   mqttServer, bindingIP, bindingPort
  rooms.json    array of room names, read at startup
  clients.json  uuid → {roomname, clientname}, edited by administrators
"#;

#[derive(Parser, Clone)]
#[command(name = "signage-server")]
#[command(about = "MQTT coordinator for room countdown timers and display onboarding")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Path to the server configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Connect to the broker and serve timers and discovery until interrupted
    Serve {
        /// Write logs to ~/.signage-server/logs instead of stderr
        #[arg(long)]
        log_file: bool,
    },

    /// List the rooms a server would create timers for
    Rooms {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List registered clients and their rooms
    Clients {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
