//! CLI module for Ganj.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Ganj - search and chat over the Ganj-e Hozour transcript archive
///
/// Builds a vector store from exported transcripts and answers questions about them.
#[derive(Parser, Debug)]
#[command(name = "ganj")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk and embed a transcript export into the vector store
    Ingest(IngestArgs),

    /// Search the vector store
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Skip the query embedding and rank by keyword matches
        #[arg(long)]
        lexical: bool,
    },

    /// Ask a question and get an answer with program citations
    Ask {
        /// The message to send
        message: String,
    },

    /// List the stored chunks of one program
    Program {
        /// Program number
        number: u32,
    },

    /// Start the HTTP chat API
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of the `ingest` command. Unset values fall back to the configuration file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct IngestArgs {
    /// Transcript export (JSON array or `{"transcripts": [...]}`)
    pub input: String,

    /// Video mapping export providing program titles
    #[arg(long)]
    pub titles: Option<String>,

    /// Output document path (defaults to the configured vector store path)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Chunks per embedding request
    #[arg(long, env = "TRANSCRIPT_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Maximum chunk length in characters
    #[arg(long, env = "TRANSCRIPT_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "TRANSCRIPT_CHUNK_OVERLAP")]
    pub chunk_overlap: Option<usize>,

    /// Index of the first transcript to process
    #[arg(long, env = "TRANSCRIPT_START", default_value = "0")]
    pub start: usize,

    /// Maximum number of transcripts to process
    #[arg(long, env = "TRANSCRIPT_LIMIT")]
    pub limit: Option<usize>,

    /// Abort the whole run when any embedding batch fails
    #[arg(long)]
    pub strict: bool,

    /// Build a lexical-only document without calling the embedding API
    #[arg(long)]
    pub no_embed: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
