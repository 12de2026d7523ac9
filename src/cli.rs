use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "discforged")]
#[command(author, version, about = "DVD and Blu-ray title navigation tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the titles on a disc
    Titles {
        /// Disc location (VIDEO_TS folder, optionally prefixed with dvd:)
        #[arg(required = true)]
        disc: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the chapter list of a title
    Chapters {
        /// Disc location
        #[arg(required = true)]
        disc: String,

        /// Title index; the longest title when omitted
        #[arg(short, long)]
        title: Option<u32>,

        /// Camera angle (0 for the first)
        #[arg(short, long)]
        angle: Option<u32>,
    },

    /// Write the linear stream of a title to a file
    Dump {
        /// Disc location
        #[arg(required = true)]
        disc: String,

        /// Title index; the longest title when omitted
        #[arg(short, long)]
        title: Option<u32>,

        /// Camera angle (0 for the first)
        #[arg(short, long)]
        angle: Option<u32>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report the disc format of a location and its probe score
    Probe {
        /// Location to probe
        #[arg(required = true)]
        location: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
