use std::path::PathBuf;

/// Zone dashboard engine (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "zonescope", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Search a coarse zone and print the resulting layers and tables
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Dashboard config file (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Coarse zone identifier
    pub id: String,

    /// Extra coarse zone ids to highlight side by side
    #[arg(long, num_args = 1..)]
    pub extra: Vec<String>,

    /// Fine-zone sub-polygon indices to select after the search
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,
}
