//! utilbox - User-space command-line toolbox
//!
//! A duplicate file finder (size grouping, then BLAKE3 content hashing)
//! together with everyday file and system utilities: disk usage, name
//! search, checksums, directory trees, base64, and read-only views of the
//! hosts file, environment and system resources.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod tools;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use cli::{
    AdminCommand, Cli, Commands, DuplicatesArgs, FilesCommand, OutputFormat, SystemCommand,
    UtilsCommand,
};
use config::Config;
use duplicates::{DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::{CsvOutput, JsonOutput, TextOutput};
use progress::Progress;
use scanner::WalkerConfig;
use signal::ShutdownHandler;
use tools::{checksum, disk_usage, encode, env, hosts, interfaces, search, system, tree};

/// Run the application, writing command output to stdout.
///
/// # Errors
///
/// Returns an error for fatal failures. Use [`ExitCode::for_error`] to map
/// it to a process exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_app_with_writer(cli, &mut handle)
}

/// Run the application, writing command output to `writer`.
///
/// Progress bars, logs and warnings still go to stderr.
///
/// # Errors
///
/// Returns an error for fatal failures (bad paths, invalid config,
/// interruption, strict-mode scan errors).
pub fn run_app_with_writer<W: Write>(cli: Cli, writer: &mut W) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let shutdown = signal::install_handler();

    log::debug!("Running {:?}", cli.command);

    match cli.command {
        Commands::Files(FilesCommand::Duplicates(args)) => {
            run_duplicates(args, cli.quiet, &config, &shutdown, writer)
        }
        Commands::Files(FilesCommand::DiskUsage(args)) => {
            let depth = args.depth.unwrap_or(config.disk_usage_depth);
            let report = disk_usage::disk_usage(&args.path, depth, Some(shutdown.flag()))?;
            disk_usage::write_disk_usage(writer, &report, args.human)?;
            Ok(ExitCode::Success)
        }
        Commands::Files(FilesCommand::Search(args)) => {
            let options = search::SearchOptions {
                pattern: args.pattern,
                extension: args.extension,
                case_sensitive: args.case_sensitive,
                regex: args.regex,
            };
            let report = search::search(&args.path, &options, Some(shutdown.flag()))?;
            search::write_search(writer, &report)?;
            Ok(ExitCode::Success)
        }
        Commands::Utils(command) => run_utils(command, &config, writer),
        Commands::Admin(AdminCommand::Hosts { file }) => {
            let path = file.unwrap_or_else(|| config.hosts_file.clone());
            let hosts_file = hosts::read_hosts(&path)?;
            hosts::write_hosts(writer, &hosts_file)?;
            Ok(ExitCode::Success)
        }
        Commands::Admin(AdminCommand::Env) => {
            env::write_env(writer, &env::collect_env())?;
            Ok(ExitCode::Success)
        }
        Commands::Admin(AdminCommand::Interfaces) => {
            interfaces::write_interfaces(writer, &interfaces::interfaces())?;
            Ok(ExitCode::Success)
        }
        Commands::System(SystemCommand::Info) => {
            system::write_system_info(writer, &system::system_info())?;
            Ok(ExitCode::Success)
        }
        Commands::System(SystemCommand::Monitor { interval, count }) => {
            system::write_monitor_header(writer)?;
            system::monitor(interval, count, Some(shutdown.flag()), |reading| {
                system::write_monitor_reading(writer, reading)?;
                writer.flush().map_err(anyhow::Error::from)
            })?;
            Ok(ExitCode::Success)
        }
    }
}

fn run_utils<W: Write>(
    command: UtilsCommand,
    config: &Config,
    writer: &mut W,
) -> anyhow::Result<ExitCode> {
    match command {
        UtilsCommand::Hash { text } => {
            checksum::write_digests(writer, &checksum::digest_bytes(text.as_bytes()))?;
        }
        UtilsCommand::HashFile { file } => {
            let digests = checksum::digest_file(&file)?;
            checksum::write_digests(writer, &digests)?;
        }
        UtilsCommand::Compare { first, second } => {
            let comparison = checksum::compare_files(&first, &second)?;
            writeln!(writer, "{}", comparison)?;
        }
        UtilsCommand::Tree(args) => {
            let options = tree::TreeOptions {
                depth: args.depth.unwrap_or(config.tree_depth),
                show_hidden: args.all,
            };
            let report = tree::build_tree(&args.path, options)?;
            tree::write_tree(writer, &report)?;
        }
        UtilsCommand::Base64 { text, decode } => {
            if decode {
                writeln!(writer, "{}", encode::decode(&text)?)?;
            } else {
                writeln!(writer, "{}", encode::encode(&text))?;
            }
        }
    }
    Ok(ExitCode::Success)
}

/// Merge CLI flags over the loaded config into a [`FinderConfig`].
fn finder_config(args: &DuplicatesArgs, config: &Config) -> FinderConfig {
    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(args.ignore_patterns.iter().cloned());

    let walker_config = WalkerConfig {
        follow_symlinks: args.follow_symlinks || config.follow_symlinks,
        skip_hidden: args.skip_hidden || config.skip_hidden,
        min_size: Some(args.min_size.unwrap_or(config.min_size)),
        max_size: args.max_size.or(config.max_size),
        ignore_patterns,
    };

    let io_threads = args.io_threads.map_or(config.io_threads, usize::from);

    FinderConfig::default()
        .with_io_threads(io_threads)
        .with_strict(args.strict)
        .with_walker_config(walker_config)
}

fn run_duplicates<W: Write>(
    args: DuplicatesArgs,
    quiet: bool,
    config: &Config,
    shutdown: &ShutdownHandler,
    writer: &mut W,
) -> anyhow::Result<ExitCode> {
    let mut finder_config = finder_config(&args, config).with_shutdown_flag(shutdown.get_flag());

    let text_mode = args.output == OutputFormat::Text;
    if text_mode && !quiet && !args.no_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let min_size = finder_config.walker_config.min_size.unwrap_or(0);
    if text_mode {
        writeln!(writer, "Scanning for duplicates in: {}", display_root(&args.path))?;
        writeln!(writer, "Minimum file size: {} bytes", min_size)?;
        writeln!(writer)?;
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&args.path)?;

    for error in &summary.scan_errors {
        log::warn!("Skipped {}: {}", error.path().display(), error.reason());
    }

    let exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else if summary.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    match args.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary).write_to(writer)?,
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, exit_code).write_to(writer, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(&groups).write_to(&mut *writer)?,
    }

    Ok(exit_code)
}

fn display_root(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
