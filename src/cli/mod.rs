// CLI module for studio-cache

use clap::Parser;
use std::path::PathBuf;

/// studio-cache - AI response cache admin server
#[derive(Parser, Debug)]
#[command(name = "studio-cache", version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to ~/.studio-cache/config.toml when present)
    #[arg(short, long, env = "STUDIO_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the admin server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
