//! portio CLI - path manipulation and stream inspection.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use portio_cli::commands::path::{self as path_cmd, FileSystemArg, SeparatorArg};
use portio_cli::commands::{self, ConfigCommand, DumpOptions, RecordFormat};
use portio_cli::{emit, logging, OutputFormat};
use portio_config::defaults::{self, ProcessDefaults};
use portio_stream::Endian;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "portio")]
#[command(about = "Cross-platform path manipulation and stream inspection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long = "output", value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Run(RunCommand),

    /// Manage portio configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Commands that run with the loaded configuration.
#[derive(clap::Subcommand, Debug)]
enum RunCommand {
    /// Collapse `.` and `..` and unify separators
    Normalize {
        path: String,

        /// Separator to write
        #[arg(short, long, value_enum, default_value = "native")]
        separator: SeparatorArg,

        /// Keep each separator as written
        #[arg(long)]
        keep_separators: bool,
    },

    /// Append path parts and normalize the result
    ///
    /// An absolute part replaces everything before it.
    Join {
        base: String,

        #[arg(required = true)]
        parts: Vec<String>,

        /// Separator to write
        #[arg(short, long, value_enum, default_value = "native")]
        separator: SeparatorArg,
    },

    /// Split a path into drive, directory, name and extension
    Split { path: String },

    /// Path that leads from directory FROM to TO
    Relative { from: String, to: String },

    /// Exit with status 1 unless PATH lies inside DIRECTORY
    IsSubdir { directory: String, path: String },

    /// Check paths against the naming rules of a file system
    Validate {
        #[arg(required = true)]
        paths: Vec<String>,

        /// File system rules (defaults to the configured one)
        #[arg(long, value_enum)]
        fs: Option<FileSystemArg>,
    },

    /// Print the records stored in a file
    Dump {
        file: PathBuf,

        /// Record layout
        #[arg(short, long, value_enum, default_value = "strings")]
        records: RecordFormat,

        /// Byte order of string lengths: big, little or local
        #[arg(short, long)]
        endian: Option<Endian>,

        /// Byte offset where reading starts
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes to read from the offset
        #[arg(long)]
        length: Option<u64>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::set_up_logging(cli.verbose);

    let command = match cli.command {
        Command::Config { command } => {
            commands::handle_config_command(command, cli.config.as_deref(), cli.format)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Run(command) => command,
    };

    let manager = commands::load_manager(cli.config.as_deref())?;
    let config = manager.config();
    defaults::init(ProcessDefaults::from(&config.paths));
    debug!(path = %manager.path().display(), "using config");

    match command {
        RunCommand::Normalize {
            path,
            separator,
            keep_separators,
        } => emit(&path_cmd::normalize(&path, separator, keep_separators), cli.format)?,
        RunCommand::Join {
            base,
            parts,
            separator,
        } => emit(&path_cmd::join(&base, &parts, separator), cli.format)?,
        RunCommand::Split { path } => emit(&path_cmd::split(&path), cli.format)?,
        RunCommand::Relative { from, to } => emit(&path_cmd::relative(&from, &to), cli.format)?,
        RunCommand::IsSubdir { directory, path } => {
            let report = path_cmd::is_subdir(&directory, &path);
            emit(&report, cli.format)?;
            if !report.is_subdirectory {
                return Ok(ExitCode::FAILURE);
            }
        }
        RunCommand::Validate { paths, fs } => {
            let fs = match fs {
                Some(arg) => arg.into(),
                None => config.paths.file_system_type()?,
            };
            let report = path_cmd::validate(&paths, fs);
            emit(&report, cli.format)?;
            if !report.all_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        RunCommand::Dump {
            file,
            records,
            endian,
            offset,
            length,
        } => {
            let options = DumpOptions {
                path: file,
                format: records,
                endian,
                offset,
                length,
            };
            emit(&commands::dump(&options, &config.streams)?, cli.format)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
