//! healthlb Entry Point

use clap::Parser;
use healthlb::cli::{check, watch, Cli, Commands};
use healthlb::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Watch(args) => {
            if let Err(e) = watch::execute(&args).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Check(args) => match check::execute(&args).await {
            Ok(0) => std::process::exit(1),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
