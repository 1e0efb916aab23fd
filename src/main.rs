//! =============================================================================
//! Magni - Point d'entrée
//! Magni - Entry point
//! =============================================================================
//!
//! # Contrôles / Controls
//! - Alt+1 (par défaut / default): Activer/désactiver la loupe / Toggle magnification
//! - Clic sur l'icône de notification / Tray icon click: Quitter / Exit
//!
//! `magni describe --width 1920 --height 1080 --at 100 100` affiche les
//! coefficients de la transformation en JSON.
//! `magni describe --width 1920 --height 1080 --at 100 100` prints the
//! transform coefficients as JSON.

// Pas de console en release : utilitaire de zone de notification
// No console in release: tray utility
#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use magni::cli::{self, Cli, Command};
use magni::config::LOG_ENV;
use magni::platform;
use magni::Result;

// =============================================================================
// JOURNALISATION
// LOGGING
// =============================================================================

/// Filtre lu dans `MAGNI_LOG` (par défaut `info`), sortie sur stderr
/// Filter read from `MAGNI_LOG` (default `info`), output on stderr
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// POINT D'ENTRÉE
// ENTRY POINT
// =============================================================================

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = try_main(&cli) {
        error!(%err, "magni stopped");
        platform::report_fatal(&err);
        std::process::exit(1);
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    let options = cli.options()?;

    match &cli.command {
        None | Some(Command::Run) => platform::run(&options),
        Some(Command::Describe(args)) => {
            let report = cli::describe(&options, args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
