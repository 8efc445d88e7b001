#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "asyncgen")]
#[command(author, version, about = "Rewrite async functions into generator-driven code", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Transform files or directories
    Transform {
        /// Files or directories to transform
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write output here, mirroring input paths (required for more than one file)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Config file (defaults to asyncgen.json in the working directory)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Do not append the runtime helpers
        #[arg(long)]
        no_helpers: bool,

        /// Parse every file, even without the `async` keyword
        #[arg(long)]
        no_fast_skip: bool,

        /// Write a .map file next to each output
        #[arg(long)]
        source_map: bool,

        /// Transform every given file, ignoring include/exclude/extensions
        #[arg(long)]
        force: bool,
    },

    /// Print the runtime helpers (all of them when no flag is given)
    Helpers {
        /// The `__async` coroutine runner
        #[arg(long = "async")]
        async_fn: bool,

        /// The `__asyncGen` async-generator driver (includes `__async`)
        #[arg(long)]
        async_gen: bool,

        /// The `__asyncIterator` normalizer used by `for await`
        #[arg(long)]
        async_iterator: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Commands::Transform {
            paths,
            out_dir,
            config,
            no_helpers,
            no_fast_skip,
            source_map,
            force,
        } => {
            let span = tracing::info_span!("transform", cmd = "transform", cwd = %cwd.display());
            let _guard = span.enter();
            let action = commands::transform::TransformAction {
                cwd,
                paths,
                out_dir,
                config,
                no_helpers,
                no_fast_skip,
                source_map,
                force,
            };
            commands::transform::run(action, cli.json)
        }
        Commands::Helpers {
            async_fn,
            async_gen,
            async_iterator,
        } => commands::helpers::run(async_fn, async_gen, async_iterator, cli.json),
    }
}
