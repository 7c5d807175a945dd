use clap::Parser;

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_INBOX_CAPACITY, ENV_PORT, ENV_WORKERS,
};

#[derive(Parser)]
#[command(name = "pubflow")]
#[command(version, about = "Interactive pub/sub dataflow execution engine", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Worker pool size (mapped onto the tokio runtime's worker threads)
    #[arg(long, short = 'w', env = ENV_WORKERS)]
    pub workers: Option<usize>,

    /// Bounded inbox capacity per agent
    #[arg(long, env = ENV_INBOX_CAPACITY)]
    pub inbox_capacity: Option<usize>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable debug logging and stage uploaded topologies to disk
    #[arg(long, env = ENV_DEBUG)]
    pub debug: bool,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
    pub inbox_capacity: Option<usize>,
    pub config: Option<PathBuf>,
    pub debug: bool,
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        host: cli.host,
        port: cli.port,
        workers: cli.workers,
        inbox_capacity: cli.inbox_capacity,
        config: cli.config,
        debug: cli.debug,
    }
}
