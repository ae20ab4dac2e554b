//! VarInfo - list the variables of a granule.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use varinfo::{GraphConfig, VariableGraph};

#[derive(Parser, Debug)]
#[command(name = "varinfo")]
#[command(about = "Map the variables of a DMR or NetCDF-4 granule", long_about = None)]
struct Args {
    /// Path to the granule (.dmr, .nc, .nc4, .h5)
    file: PathBuf,

    /// Rule document (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Collection short name, instead of reading it from the granule
    #[arg(long)]
    short_name: Option<String>,

    /// Mission name, instead of looking it up from the short name
    #[arg(long)]
    mission: Option<String>,

    /// Print the variables needed to subset these variables
    #[arg(long = "required", value_name = "VARIABLE")]
    required: Vec<String>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,
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
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(log_file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting VarInfo");
    }

    if !args.file.exists() {
        anyhow::bail!("Path not found: {}", args.file.display());
    }

    let mut config = GraphConfig::new();
    config.short_name = args.short_name;
    config.mission = args.mission;
    config.config_file = args.config;

    let graph = VariableGraph::from_file(&args.file, &config)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("Short name: {}", graph.short_name().unwrap_or("unknown"));
    println!("Mission: {}", graph.mission().unwrap_or("unknown"));

    if args.required.is_empty() {
        print_section("Science variables", graph.get_science_variables());
        print_section("Metadata variables", graph.get_metadata_variables());
    } else {
        let requested: HashSet<String> = args.required.into_iter().collect();
        print_section("Required variables", graph.get_required_variables(&requested));
    }

    if args.log.is_some() {
        tracing::info!("VarInfo exited");
    }

    Ok(())
}

fn print_section(title: &str, paths: HashSet<String>) {
    println!("\n{}:", title);
    for path in paths.into_iter().collect::<BTreeSet<_>>() {
        println!("  {}", path);
    }
}
