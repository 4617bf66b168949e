use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flickfinder")]
#[command(about = "Find a random Flickr photo by phrase or by location", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML config file (default: the per-user flickfinder.yaml, if present)
    #[arg(long, env = "FLICK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Write the downloaded image to this path
    #[arg(long, global = true)]
    pub save: Option<PathBuf>,

    /// Seed the photo pick so repeated runs choose the same index
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Only report the photo URL, do not download the image
    #[arg(long, global = true)]
    pub no_image: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search by free text
    Phrase {
        /// Words to search for; joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Search around a latitude/longitude
    Location {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },
    /// Read `phrase <text>` / `location <lat> <lon>` lines from stdin
    Interactive,
}
