//! Keypoints CLI
//!
//! Runs the branch instrumentation pass over a compilation unit lowered to
//! JSON, and inspects the cross-invocation state it leaves behind.
//!
//! # Usage
//!
//! ```bash
//! # Instrument a unit, writing the instrumented module next to it
//! keypoints instrument --input main.json --output main.instrumented.json
//!
//! # Same, with the counter lock enabled and state under build/
//! keypoints --output-dir build instrument --input main.json --lock
//!
//! # Inspect state
//! keypoints dictionary
//! keypoints counter
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use keypoints_ir::{InstrumentUnitUseCase, InstrumentationConfig, Module, Result};
use keypoints_storage::{read_dictionary, CounterStore, FileCounterStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keypoints")]
#[command(about = "Branch instrumentation pass with a persistent branch dictionary", long_about = None)]
struct Cli {
    /// YAML configuration file (version: 1)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding branch_dictionary.txt and counter.log
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument one compilation unit
    Instrument {
        /// Module JSON produced by the host adapter
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the instrumented module (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Guard the counter with an advisory lock
        #[arg(long)]
        lock: bool,

        /// Print the plan as JSON instead of a summary
        #[arg(long)]
        plan: bool,
    },

    /// List branch dictionary entries
    Dictionary,

    /// Show the next branch id to allocate
    Counter,
}

fn load_config(cli: &Cli) -> Result<InstrumentationConfig> {
    let mut config = match &cli.config {
        Some(path) => InstrumentationConfig::from_yaml(path)?,
        None => InstrumentationConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Instrument {
            input,
            output,
            lock,
            plan,
        } => {
            if lock {
                config.lock_counter = true;
            }

            let mut module: Module = serde_json::from_str(&fs::read_to_string(&input)?)?;
            let result = InstrumentUnitUseCase::from_config(&config)?.execute_and_apply(&mut module)?;

            let instrumented = serde_json::to_string_pretty(&module)?;
            match output {
                Some(path) => fs::write(path, instrumented)?,
                None => println!("{}", instrumented),
            }

            if plan {
                eprintln!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                eprintln!(
                    "{}: {} branch entries, {} insertions, next id {}",
                    result.source_file,
                    result.entries.len(),
                    result.injections.len(),
                    result.next_id
                );
            }
        }
        Commands::Dictionary => {
            for entry in read_dictionary(config.dictionary_path())? {
                println!("{}", entry);
            }
        }
        Commands::Counter => {
            let next = FileCounterStore::new(config.counter_path()).load()?;
            println!("{}", next);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keypoints: {}", err);
            if err.is_retryable() {
                eprintln!("keypoints: another invocation holds the counter lock; retry later");
            }
            ExitCode::FAILURE
        }
    }
}
