mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphql-embed")]
#[command(about = "Inspect and edit GraphQL embedded in host source files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to GraphQL config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where a command is pointed inside a host file. Lines and characters are
/// zero-based.
#[derive(clap::Args, Debug, Clone, Copy)]
struct Cursor {
    /// Line of the embedded GraphQL to work on
    #[arg(short, long)]
    line: usize,

    /// Character offset on that line
    #[arg(long, default_value_t = 0)]
    character: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List the GraphQL embedded in a file or directory
    Extract {
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Describe the node a record path names
    Context {
        file: PathBuf,

        #[command(flatten)]
        cursor: Cursor,

        /// Record path, e.g. `fragment_friends_edges_node`
        #[arg(short, long)]
        record: String,

        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Describe the record type the analysis tool reports under the cursor
    Hover {
        file: PathBuf,

        #[command(flatten)]
        cursor: Cursor,

        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Reprint every embedded GraphQL region
    Format {
        file: PathBuf,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Add a field to the selection set at a record path
    AddField {
        file: PathBuf,

        #[command(flatten)]
        cursor: Cursor,

        #[arg(short, long)]
        record: String,

        /// Name of the field to select
        #[arg(long)]
        field: String,
    },

    /// Move the selections on a range of lines into a new fragment
    ExtractFragment {
        file: PathBuf,

        #[command(flatten)]
        cursor: Cursor,

        /// First host line of the selections to move
        #[arg(long)]
        start_line: usize,

        /// Last host line of the selections to move
        #[arg(long)]
        end_line: usize,

        /// Name of the new fragment
        #[arg(short, long)]
        name: String,
    },

    /// Set up cursor pagination on a connection field
    Paginate {
        file: PathBuf,

        #[command(flatten)]
        cursor: Cursor,

        #[arg(short, long)]
        record: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Extract { path, format } => {
            commands::extract::run(config, &path, format)?;
        }
        Commands::Context {
            file,
            cursor,
            record,
            format,
        } => {
            commands::context::run(config, &file, cursor, &record, format)?;
        }
        Commands::Hover {
            file,
            cursor,
            format,
        } => {
            commands::context::hover(config, &file, cursor, format).await?;
        }
        Commands::Format { file, write } => {
            commands::format::run(config, &file, write)?;
        }
        Commands::AddField {
            file,
            cursor,
            record,
            field,
        } => {
            commands::edit::add_field(config, &file, cursor, &record, &field)?;
        }
        Commands::ExtractFragment {
            file,
            cursor,
            start_line,
            end_line,
            name,
        } => {
            commands::edit::extract_fragment(config, &file, cursor, start_line, end_line, &name)?;
        }
        Commands::Paginate {
            file,
            cursor,
            record,
        } => {
            commands::edit::paginate(config, &file, cursor, &record)?;
        }
    }

    Ok(())
}
