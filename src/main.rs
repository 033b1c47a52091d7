//! dap2 - Inspect DAP2 dataset descriptions and DODS responses.

use anyhow::{Context, Result};
use clap::Parser;
use dap2::util::{format_schema_tree, format_values};
use dap2::{DapReader, FileSource};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dap2")]
#[command(about = "Decode OPeNDAP DAP2 documents", long_about = None)]
struct Args {
    /// Base path of a dataset; `<base>.dds` and `<base>.das` are read
    base: Option<String>,

    /// Decode a DODS response file and print its values
    #[arg(long)]
    dods: Option<PathBuf>,

    /// Do not merge `<base>.das` into the schema
    #[arg(long)]
    no_das: bool,

    /// Print summary statistics for numeric arrays
    #[arg(long)]
    stats: bool,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Log at trace level instead of debug
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let level = if args.verbose { Level::TRACE } else { Level::DEBUG };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(log_file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting dap2");
    }

    if args.base.is_none() && args.dods.is_none() {
        anyhow::bail!("Nothing to do: pass a dataset base path and/or --dods <file>");
    }

    let reader = DapReader::new(FileSource::new());

    if let Some(base) = &args.base {
        let schema = if args.no_das {
            reader.load_dds(&format!("{}.dds", base))
        } else {
            reader.load_dataset(base)
        }
        .with_context(|| format!("Failed to load dataset {}", base))?;
        print!("{}", format_schema_tree(&schema, !args.no_das));
    }

    if let Some(dods) = &args.dods {
        let location = dods.to_string_lossy();
        let response = reader
            .load_data_and_dds(&location)
            .with_context(|| format!("Failed to decode {}", dods.display()))?;
        if args.base.is_some() {
            println!();
        }
        print!("{}", format_values(&response.values, args.stats));
    }

    if args.log.is_some() {
        tracing::info!("dap2 exited");
    }

    Ok(())
}
