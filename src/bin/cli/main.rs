//! CLI tool for arcmgr archive operations.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Game archive inspection tool
#[derive(Parser)]
#[command(name = "arcmgr")]
#[command(author, version, about = "Game archive inspection tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the container format of files (alias: id)
    #[command(alias = "id")]
    Identify {
        /// Files or directories to identify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List archive contents (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file or directory to list
        archive: PathBuf,

        /// Also open and list wads embedded at the archive's root
        #[arg(long)]
        nested: bool,
    },

    /// Resolve a resource across archives
    Find {
        /// Entry name or path; with --all, a glob pattern
        name: String,

        /// Archives to search, in load order
        #[arg(short = 'a', long = "archive", num_args = 1.., required = true)]
        archives: Vec<PathBuf>,

        /// Base resource searched as the fallback
        #[arg(short = 'b', long)]
        base: Option<PathBuf>,

        /// Report every match instead of the one that wins
        #[arg(long)]
        all: bool,
    },

    /// Report duplicate entry names and contents
    Check {
        /// Archive file or directory to check
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let exit_code = match cli.command {
        Commands::Identify { files } => commands::identify(&files, cli.format),

        Commands::List { archive, nested } => commands::list(&archive, nested, cli.format),

        Commands::Find {
            name,
            archives,
            base,
            all,
        } => commands::find(&commands::FindConfig {
            name: &name,
            archives: &archives,
            base: base.as_deref(),
            all,
            format: cli.format,
        }),

        Commands::Check { archive } => commands::check(&archive, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
