//! Shelfmark command-line front end
//!
//! Creates, updates and queries the file-metadata catalog stored under a
//! root directory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shelfmark::{MediaKind, WeightingMethod};
use shelfmark_logging::LogConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "shelfmark", about = "Personal file-metadata catalog", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a catalog for every matching file under ROOT
    Init {
        root: PathBuf,

        /// Schema (model.json) describing the fields
        #[arg(short, long, env = "SHELFMARK_MODEL")]
        model: Option<PathBuf>,
    },

    /// Write a schema file for a new catalog
    Model {
        /// Where to write the schema
        output: PathBuf,

        /// Catalog name (defaults to the output file stem)
        #[arg(long)]
        name: Option<String>,

        /// Kind of files to index: video, audio or text
        #[arg(long, default_value = "video")]
        media: MediaKind,

        /// Extra single-value field (repeatable)
        #[arg(long = "single")]
        single: Vec<String>,

        /// Extra list field (repeatable)
        #[arg(long = "list")]
        list: Vec<String>,

        /// Field used for queries and guessing (repeatable)
        #[arg(long = "secondary")]
        secondary: Vec<String>,

        /// Value type override as FIELD=TYPE, e.g. Rating=int (repeatable)
        #[arg(long = "value-type")]
        value_types: Vec<String>,

        /// Print the schema instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Reconcile the catalog with the files on disk and save it
    Sync {
        root: PathBuf,

        /// Do not move the highest ID into slots freed by missing files
        #[arg(long)]
        keep_ids: bool,

        /// Renumber every record from 0 afterwards
        #[arg(long)]
        reset_ids: bool,

        /// Do not add records for new files
        #[arg(long)]
        skip_new: bool,
    },

    /// Show a summary of the catalog
    Status {
        root: PathBuf,

        /// List the schema fields
        #[arg(long)]
        fields: bool,
    },

    /// Find records by value; prefix a value with ! to exclude it
    Query {
        root: PathBuf,

        /// Field to search (repeatable; defaults to the secondary fields)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        #[arg(required = true)]
        values: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List records ordered by a field, largest or newest first
    Sorted {
        root: PathBuf,

        field: String,

        /// Smallest or oldest first
        #[arg(long)]
        ascending: bool,

        /// Show at most N records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick a random record, optionally out of a query
    Random {
        root: PathBuf,

        /// Field to search (repeatable; defaults to the secondary fields)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Query values restricting the candidates
        values: Vec<String>,

        /// Ignore how often records were opened
        #[arg(long)]
        uniform: bool,

        /// Weighting method
        #[arg(long, default_value = "times_opened")]
        method: WeightingMethod,

        /// Record the pick as opened and save
        #[arg(long)]
        mark: bool,
    },

    /// Guess secondary field values from a relative path
    Guess {
        root: PathBuf,

        path: String,

        /// Match whole path segments only
        #[arg(long)]
        fast: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a single-value field of a record
    Set {
        root: PathBuf,
        id: String,
        field: String,
        value: String,
    },

    /// Add, remove or replace a value of a list field
    Tag {
        root: PathBuf,
        id: String,
        field: String,
        value: String,

        /// Remove VALUE instead of adding it
        #[arg(long, conflicts_with = "replace")]
        remove: bool,

        /// Replace OLD with VALUE
        #[arg(long, value_name = "OLD")]
        replace: Option<String>,
    },
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { root, model } => cli::init::run(cli::init::InitArgs { root, model }),

        Commands::Model {
            output,
            name,
            media,
            single,
            list,
            secondary,
            value_types,
            dry_run,
        } => cli::model::run(cli::model::ModelArgs {
            output,
            name,
            media,
            single,
            list,
            secondary,
            value_types,
            dry_run,
        }),

        Commands::Sync {
            root,
            keep_ids,
            reset_ids,
            skip_new,
        } => cli::sync::run(cli::sync::SyncArgs {
            root,
            keep_ids,
            reset_ids,
            skip_new,
        }),

        Commands::Status { root, fields } => {
            cli::status::run(cli::status::StatusArgs { root, fields })
        }

        Commands::Query {
            root,
            fields,
            values,
            json,
        } => cli::query::run(cli::query::QueryArgs {
            root,
            fields,
            values,
            json,
        }),

        Commands::Sorted {
            root,
            field,
            ascending,
            limit,
            json,
        } => cli::query::run_sorted(cli::query::SortedArgs {
            root,
            field,
            ascending,
            limit,
            json,
        }),

        Commands::Random {
            root,
            fields,
            values,
            uniform,
            method,
            mark,
        } => cli::random::run(cli::random::RandomArgs {
            root,
            fields,
            values,
            uniform,
            method,
            mark,
        }),

        Commands::Guess {
            root,
            path,
            fast,
            json,
        } => cli::guess::run(cli::guess::GuessArgs {
            root,
            path,
            fast,
            json,
        }),

        Commands::Set {
            root,
            id,
            field,
            value,
        } => cli::edit::run_set(cli::edit::SetArgs {
            root,
            id,
            field,
            value,
        }),

        Commands::Tag {
            root,
            id,
            field,
            value,
            remove,
            replace,
        } => cli::edit::run_tag(cli::edit::TagArgs {
            root,
            id,
            field,
            value,
            remove,
            replace,
        }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = shelfmark_logging::init_logging(LogConfig {
        app_name: "shelfmark",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(helpful) = err.downcast_ref::<cli::error::HelpfulError>() {
                eprint!("{}", helpful);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
