//! Command-line interface definition

use std::path::PathBuf;

use clap::Parser;

/// Process exit codes
pub mod exit_codes {
    /// Window closed normally
    pub const SUCCESS: i32 = 0;
    /// Client initialization failed, or the GUI could not start
    pub const INIT_FAILURE: i32 = 1;
    /// Configuration could not be loaded
    pub const CONFIG_ERROR: i32 = 2;
}

/// JoyBank account viewer: pick a user, see their balance
#[derive(Debug, Parser)]
#[command(name = "joybank-viewer", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the service-account key file (JSON)
    #[arg(long, env = "JOYBANK_CREDENTIAL_PATH", value_name = "PATH")]
    pub credential_path: Option<PathBuf>,

    /// Base URL of the document database REST API
    #[arg(long, env = "JOYBANK_ENDPOINT_URL", value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Project id, overriding the one in the key file
    #[arg(long, env = "JOYBANK_PROJECT_ID", value_name = "ID")]
    pub project_id: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_output: bool,
}
