// Hide console window on Windows release builds
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

//! JoyBank account viewer
//!
//! A single-window tool: pick a user from a dropdown and see the balance of
//! their main account, read from Cloud Firestore.

mod cli;
mod core;
mod logging;
mod native_ui;
mod settings;
mod store;
mod viewer;

use clap::Parser;
use cli::{exit_codes, Cli};
use settings::Settings;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::INIT_FAILURE;
    }

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            return exit_codes::CONFIG_ERROR;
        }
    };
    settings.apply_cli(&cli);

    // Runtime for the HTTP client; the UI drives it with block_on
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::INIT_FAILURE;
        }
    };

    match native_ui::run(settings, runtime) {
        Ok(native_ui::RunOutcome::Closed) => exit_codes::SUCCESS,
        Ok(native_ui::RunOutcome::InitFailed) => exit_codes::INIT_FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            exit_codes::INIT_FAILURE
        }
    }
}
