use std::{net::SocketAddr, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::server::{shutdown::detect_shutdown, start_server, ServerConfig};

#[derive(Debug, Parser)]
pub struct ServeCommand {
    #[arg(long, help = "CSV file with presence data. Rows are user_id,date,start,end")]
    data: PathBuf,
    #[arg(long, default_value = "templates", help = "Directory with HTML pages")]
    templates: PathBuf,
    #[arg(long, default_value = "127.0.0.1:5000", help = "Address to listen on")]
    bind: SocketAddr,
    #[arg(
        long,
        help = "Keep parsed data in memory until the CSV file is modified, instead of reading it on every request"
    )]
    cache: bool,
}

impl From<ServeCommand> for ServerConfig {
    fn from(
        ServeCommand {
            data,
            templates,
            bind,
            cache,
        }: ServeCommand,
    ) -> Self {
        ServerConfig {
            data_csv: data,
            pages_dir: templates,
            bind,
            cache,
        }
    }
}

pub async fn process_serve_command(command: ServeCommand) -> Result<()> {
    let shutdown_token = CancellationToken::new();
    tokio::spawn(detect_shutdown(shutdown_token.clone()));
    start_server(command.into(), shutdown_token).await
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::server::ServerConfig;

    use super::ServeCommand;

    #[test]
    fn test_serve_defaults() {
        let command = ServeCommand::parse_from(["serve", "--data", "runtime/data/test_data.csv"]);
        let config: ServerConfig = command.into();
        assert_eq!(config.data_csv.to_str(), Some("runtime/data/test_data.csv"));
        assert_eq!(config.pages_dir.to_str(), Some("templates"));
        assert_eq!(config.bind.port(), 5000);
        assert!(!config.cache);
    }
}
