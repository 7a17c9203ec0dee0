mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use vidserve::{config, server, tools};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "vidserve=trace,tower_http=debug"
    } else {
        "vidserve=debug,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Some(Commands::CheckTools) => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let mut missing = false;
            for tool in tools::check_tools(&config.tools) {
                match tool.path {
                    Some(path) => println!("{}: {}", tool.name, path.display()),
                    None => {
                        println!("{}: NOT FOUND", tool.name);
                        missing = true;
                    }
                }
            }
            if missing {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Validate { config }) => {
            config::load_config(&config)?;
            println!("{}: OK", config.display());
            Ok(())
        }
        Some(Commands::Serve { host, port }) => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::start_server(config).await
        }
        None => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            server::start_server(config).await
        }
    }
}
