use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use logid::fs::{FileSystem, OsFileSystem};
use logid::{
    assign_id, reconcile, FormatDescriptor, IdConfig, IdTable, LocationTable, ReverseIndex,
    Severity,
};

#[derive(Parser)]
#[command(name = "logid", version, about = "Maintains the ID list of ID-based binary logs")]
struct Cli {
    /// Write tracing output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assign an ID to a format string, reusing the ID of an identical one
    New(NewArgs),
    /// Add missing format-specifier counts to type tags
    Reconcile {
        #[arg(long, default_value = "til.json")]
        list: PathBuf,
    },
    /// Print the ID list, with locations and duplicate formats
    Show {
        #[arg(long, default_value = "til.json")]
        list: PathBuf,
        #[arg(long)]
        locations: Option<PathBuf>,
    },
}

#[derive(Args)]
struct NewArgs {
    #[arg(long, default_value = "til.json")]
    list: PathBuf,
    #[arg(long = "type")]
    type_tag: String,
    #[arg(long = "fmt")]
    format: String,
    /// JSON file with `min`, `max` and `method`
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    min: Option<u32>,
    #[arg(long)]
    max: Option<u32>,
    /// random, upward or downward
    #[arg(long)]
    method: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    let mut diag = io::stderr();
    match run(cli.command, &OsFileSystem, &mut diag) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Advisory errors that reach this point still left us without a
            // usable result, so both severities stop the run.
            match e.severity() {
                Severity::Fatal => error!(error = %e, "fatal error, ID list left unchanged"),
                Severity::Advisory => error!(error = %e, "cannot continue"),
            }
            eprintln!("logid: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logid=info"));
    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or_else(|| "logid.log".as_ref());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
            None
        }
    }
}

fn run(command: Command, fs: &dyn FileSystem, diag: &mut dyn Write) -> logid::Result<()> {
    match command {
        Command::New(args) => {
            let config = resolve_config(&args, fs)?;
            let mut table = IdTable::load_from_file(fs, &args.list, diag)?;
            let id = assign_id(
                &mut table,
                FormatDescriptor::new(args.type_tag, args.format),
                &config,
                diag,
            )?;
            table.save_to_file(fs, &args.list)?;
            println!("{id}");
        }
        Command::Reconcile { list } => {
            let mut table = IdTable::load_from_file(fs, &list, diag)?;
            let report = reconcile(&mut table, diag);
            table.save_to_file(fs, &list)?;
            writeln!(
                diag,
                "{} type tags updated, {} skipped.",
                report.updated.len(),
                report.skipped.len()
            )?;
        }
        Command::Show { list, locations } => {
            let table = IdTable::load_from_file(fs, &list, diag)?;
            let locations = match locations {
                Some(path) => LocationTable::load_from_file(fs, &path, diag)?,
                None => LocationTable::new(),
            };
            let mut out = io::stdout().lock();
            for (&id, descriptor) in &table {
                match locations.get(id) {
                    Some(li) => writeln!(out, "{id}\t{descriptor}\t{}:{}", li.file, li.line)?,
                    None => writeln!(out, "{id}\t{descriptor}")?,
                }
            }
            let index = ReverseIndex::build(&table);
            for (descriptor, ids) in index.duplicates() {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                writeln!(diag, "duplicate format {descriptor} under IDs {}", ids.join(", "))?;
            }
        }
    }
    Ok(())
}

fn resolve_config(args: &NewArgs, fs: &dyn FileSystem) -> logid::Result<IdConfig> {
    let mut config = match &args.config {
        Some(path) => IdConfig::load_from_file(fs, path)?,
        None => IdConfig::default(),
    };
    if let Some(min) = args.min {
        config.min = min;
    }
    if let Some(max) = args.max {
        config.max = max;
    }
    if let Some(method) = &args.method {
        config.method = method.parse()?;
    }
    config.validate()?;
    Ok(config)
}
