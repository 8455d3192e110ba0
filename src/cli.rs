use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tvshow-tracker")]
#[command(about = "Check feeds for new episodes of your favorite TV shows and hand off their magnet links")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ledger database, overriding `database_path` from the config
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Log feed requests and ledger decisions
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
