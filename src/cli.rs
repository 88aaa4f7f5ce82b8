//! Command line interface module
//! Argument and subcommand definitions for the flagday binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for flagday
#[derive(Debug, Parser)]
#[command(
    name = "flagday",
    version,
    about = "Country of the day flag client: show today's flag, search countries, change the flag"
)]
pub struct CliArgs {
    /// Path to a JSON configuration file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the flag of the day with its country facts and map position
    Today,

    /// Ranked autocomplete suggestions for a query
    Search {
        /// Text typed so far (case-insensitive)
        query: String,

        /// Maximum number of suggestions (default from configuration)
        #[arg(short = 'l', long = "limit")]
        limit: Option<usize>,

        /// Comma-separated key presses to replay over the suggestions
        /// (e.g. down,down,enter)
        #[arg(short = 'k', long = "keys", value_delimiter = ',')]
        keys: Vec<Key>,

        /// Change the flag to the committed suggestion
        #[arg(long = "apply")]
        apply: bool,
    },

    /// List countries whose name or region contains the query, sorted by name
    Browse {
        /// Name or region text; lists every country when omitted
        query: Option<String>,
    },

    /// Pixel position of a country on the world map
    Locate {
        /// Country name (lenient match)
        country: String,

        /// Map width in pixels (default from configuration)
        #[arg(long = "width")]
        width: Option<f64>,

        /// Map height in pixels (default from configuration)
        #[arg(long = "height")]
        height: Option<f64>,
    },

    /// Change the flag of the day
    Set {
        /// Country name sent to the flag service
        country: String,
    },
}

/// Keyboard input replayed over a suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Key {
    Down,
    Up,
    /// Commit the focused suggestion
    Enter,
    /// Commit the focused suggestion, or the first one when none is focused
    Tab,
}
