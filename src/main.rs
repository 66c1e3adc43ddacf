use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "moneta",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local-first code memory system",
    long_about = "Moneta is a local-first code memory system that helps you store and \
retrieve code context, patterns, and decisions using semantic search.\n\n\
It runs entirely on your machine using local embeddings (Ollama) and SQLite \
for storage.\n\n\
Examples:\n  \
moneta add \"We use Repository pattern for database access\" --type pattern\n  \
moneta search \"how do we access the database\"\n  \
moneta index ./src --project myapp\n  \
moneta serve"
)]
struct Cli {
    /// Data directory (default: ~/.moneta)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Project name (default: current directory name)
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a memory
    Add {
        /// Memory content (joined with spaces)
        #[arg(required = true)]
        content: Vec<String>,

        /// Memory type (architecture, pattern, decision, gotcha, context, preference)
        #[arg(short = 't', long = "type", default_value = "context")]
        memory_type: String,

        /// Associated file path
        #[arg(short, long)]
        file: Option<String>,

        /// Programming language
        #[arg(short, long)]
        lang: Option<String>,

        /// Metadata as key=value pairs
        #[arg(short, long = "meta")]
        meta: Vec<String>,
    },

    /// Search for memories
    Search {
        /// Query text (joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum results to return
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Minimum similarity threshold (0-1)
        #[arg(short, long, default_value_t = 0.5)]
        threshold: f32,

        /// Filter by memory type
        #[arg(long = "type")]
        memory_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index a file or directory
    Index {
        /// Path to index
        path: String,
    },

    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 3456)]
        port: u16,
    },

    /// List memories
    List {
        /// Maximum results
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Filter by type
        #[arg(long = "type")]
        memory_type: Option<String>,
    },

    /// Delete a memory
    Delete {
        /// Memory ID
        id: Option<String>,

        /// Delete all memories in the project
        #[arg(long)]
        all: bool,
    },

    /// Show statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    commands::init_logging(cli.verbose);

    let globals = commands::GlobalArgs {
        data_dir: cli.data_dir,
        project: cli.project,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Add {
            content,
            memory_type,
            file,
            lang,
            meta,
        } => {
            commands::add::execute(&globals, content, memory_type, file, lang, meta)?;
        }
        Commands::Search {
            query,
            limit,
            threshold,
            memory_type,
            json,
        } => {
            commands::search::execute(&globals, query, limit, threshold, memory_type, json)?;
        }
        Commands::Index { path } => {
            commands::index::execute(&globals, path)?;
        }
        Commands::Serve { host, port } => {
            commands::serve::execute(&globals, host, port)?;
        }
        Commands::List { limit, memory_type } => {
            commands::list::execute(&globals, limit, memory_type)?;
        }
        Commands::Delete { id, all } => {
            commands::delete::execute(&globals, id, all)?;
        }
        Commands::Stats => {
            commands::stats::execute(&globals)?;
        }
    }

    Ok(())
}
