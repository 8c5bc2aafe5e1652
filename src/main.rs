use clap::Parser;
use signage_server::cli::{Cli, Commands};
use signage_server::cli_handlers::{handle_clients_command, handle_rooms_command};
use signage_server::config::ServerConfig;
use signage_server::error::{ErrorResponse, SignageError};
use signage_server::logging::{
    cleanup_old_logs, init_logging, log_dir, log_file_path, ApplicationMode, LoggingConfig,
};
use signage_server::server::SignageServer;

const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = match logging_for(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to prepare log file: {}", e);
            std::process::exit(1);
        },
    };
    let file_logging = log_config.file_output.is_some();

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if file_logging {
        if let Some(dir) = log_dir() {
            let retention_days = std::env::var("SIGNAGE_LOG_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LOG_RETENTION_DAYS);
            cleanup_old_logs(&dir, retention_days).ok();
        }
    }

    if let Err(e) = run(&cli).await {
        let error_response = match e.downcast_ref::<SignageError>() {
            Some(err) => err.to_error_response(),
            None => ErrorResponse {
                error: format!("{:#}", e),
                code: "INTERNAL_ERROR".to_string(),
            },
        };
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{:#}", e),
        }
        std::process::exit(1);
    }
}

/// Listing commands stay quiet unless asked; `serve` logs at info and can be
/// sent to a rotating file with `--log-file` or `SIGNAGE_LOG_FILE`.
fn logging_for(cli: &Cli) -> std::io::Result<LoggingConfig> {
    match &cli.command {
        Commands::Serve { log_file } => {
            if *log_file || std::env::var("SIGNAGE_LOG_FILE").is_ok() {
                let mut config = LoggingConfig::for_mode(ApplicationMode::Server);
                config.json_format = cli.json;
                config.file_output = Some(log_file_path(ApplicationMode::Server)?);
                return Ok(config);
            }
            Ok(LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json))
        },
        _ if cli.verbose > 0 || cli.json => {
            Ok(LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json))
        },
        _ => Ok(LoggingConfig::for_mode(ApplicationMode::Cli)),
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Serve { .. } => SignageServer::new(config).run().await?,
        Commands::Rooms { format } => handle_rooms_command(&config, format).await?,
        Commands::Clients { format } => handle_clients_command(&config, format).await?,
    }

    Ok(())
}
