mod capture;
mod collectors;
mod config;
mod menu;
mod state;
mod store;

use capture::capture_system_state;
use clap::error::ErrorKind;
use clap::Parser;
use collectors::SystemRunner;
use config::Config;
use menu::Menu;
use std::path::PathBuf;
use store::StateStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "discover")]
#[command(version)]
#[command(about = "Discover Docker Compose projects, Kubernetes contexts and systemd services")]
#[command(after_help = "Run without arguments for interactive mode.")]
struct Cli {
    /// Capture the current system state and exit
    #[arg(long)]
    capture_state: bool,
    /// Configuration file (default: ~/.discover/config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print an example configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    let cli = parse_cli();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    init_tracing(if cli.capture_state { "info" } else { "warn" });

    let cfg = match Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let store = StateStore::resolve(cfg.state_dir.as_deref());
    let runner = SystemRunner;

    if cli.capture_state {
        println!("Capturing system state...");
        match capture_system_state(&runner, &cfg, &store) {
            Ok(_) => println!(
                "System state captured and saved to {}",
                store.path().display()
            ),
            Err(err) => {
                error!(error = %err, "failed to capture system state");
                std::process::exit(1);
            }
        }
        return;
    }

    info!(state_file = %store.path().display(), "starting interactive menu");
    Menu::new(&runner, &cfg, &store).run();
}

/// Help and version exit 0; anything else clap rejects exits 1 with a hint.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(0);
            }
            _ => {
                let _ = err.print();
                eprintln!("\nRun without arguments for interactive mode.");
                std::process::exit(1);
            }
        },
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_flag_parses() {
        let cli = Cli::try_parse_from(["discover", "--capture-state"]).unwrap();
        assert!(cli.capture_state);
        assert!(cli.config.is_none());
    }

    #[test]
    fn help_is_a_display_request() {
        let err = Cli::try_parse_from(["discover", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = Cli::try_parse_from(["discover", "--frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        let err = Cli::try_parse_from(["discover", "status"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
