//! Inspect, reset and simulate test-run achievements
//!
//! Works on the same store file a test run would use: `ACHIEVEMENTS_FILE`
//! or `.achievements` in the working directory, unless `--file` is given.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};

use ach_catalog::builtin_registry;
use ach_core::persist::{delete_store, load_from_path, load_or_default};
use ach_core::runner::run_suite;
use ach_core::{Engine, EngineConfig, TestCase, TestOutcome, UnlockStore};

/// Test-run achievements
#[derive(Parser, Debug)]
#[command(name = "achievements")]
#[command(author, version, about = "Inspect and simulate test-run achievements", long_about = None)]
struct Args {
    /// Store file (defaults to $ACHIEVEMENTS_FILE or .achievements)
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,

    /// Verbose logging; repeat for more
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every built-in achievement and whether it is unlocked
    List,
    /// Dump the stored facts as JSON
    Facts,
    /// Delete the store file
    Reset,
    /// Run a synthetic test suite through the engine
    Simulate {
        /// Passing tests
        #[arg(long = "pass", default_value_t = 0)]
        pass: usize,

        /// Failing tests
        #[arg(long = "fail", default_value_t = 0)]
        fail: usize,

        /// Erroring tests
        #[arg(long = "error", default_value_t = 0)]
        error: usize,

        /// Keep results in memory instead of writing the store file
        #[arg(long = "no-save")]
        no_save: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = EngineConfig::from_env();
    if let Some(file) = &args.file {
        config = config.with_storage_path(file);
    }
    debug!(?config, "resolved configuration");

    match args.command {
        Command::List => list(&config),
        Command::Facts => facts(&config),
        Command::Reset => reset(&config),
        Command::Simulate {
            pass,
            fail,
            error,
            no_save,
        } => {
            if no_save {
                config = config.without_storage();
            }
            simulate(config, pass, fail, error)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn current_store(config: &EngineConfig) -> UnlockStore {
    match &config.storage_path {
        Some(path) => load_or_default(path),
        None => UnlockStore::new(),
    }
}

fn list(config: &EngineConfig) -> Result<()> {
    let store = current_store(config);
    let registry = builtin_registry();
    for entry in registry.entries() {
        let mark = if store.is_unlocked(&entry.info.achievement_id()) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("{mark} {:<18} {}", entry.info.id, entry.info.subtitle);
    }
    // Kinds unlocked by achievements outside the built-in catalog
    for id in store
        .unlocked()
        .filter(|id| registry.get(id.as_str()).is_none())
    {
        println!("[x] {id}");
    }
    Ok(())
}

fn facts(config: &EngineConfig) -> Result<()> {
    let Some(path) = &config.storage_path else {
        return Ok(());
    };
    // Unlike a test run, a corrupt file is worth reporting here
    let store = if path.exists() {
        load_from_path(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        UnlockStore::new()
    };
    let facts: serde_json::Map<String, serde_json::Value> = store
        .facts()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&facts)?);
    Ok(())
}

fn reset(config: &EngineConfig) -> Result<()> {
    if let Some(path) = &config.storage_path {
        delete_store(path).with_context(|| format!("deleting {}", path.display()))?;
        info!("removed {}", path.display());
    }
    Ok(())
}

fn simulate(config: EngineConfig, pass: usize, fail: usize, error: usize) -> Result<()> {
    let plan = [
        (pass, TestOutcome::Passed, "pass"),
        (fail, TestOutcome::Failed, "fail"),
        (error, TestOutcome::Errored, "error"),
    ];
    let tests: Vec<TestCase> = plan
        .into_iter()
        .flat_map(|(count, outcome, prefix)| {
            (0..count).map(move |i| TestCase::new(format!("{prefix}_{i}")).with_outcome(outcome))
        })
        .collect();

    let mut engine = Engine::new(config).with_registry(builtin_registry());
    let summary = run_suite(&mut engine, tests, Box::new(io::stdout()))
        .context("simulated run failed")?;

    for failure in &summary.hook_failures {
        info!(
            "{} failed during {}: {}",
            failure.achievement, failure.event, failure.message
        );
    }
    if !summary.unlocked_anything() {
        info!("nothing unlocked this run");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let args = Args::parse_from([
            "achievements",
            "-v",
            "simulate",
            "--pass",
            "3",
            "--fail",
            "1",
            "--no-save",
        ]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Simulate {
                pass,
                fail,
                error,
                no_save,
            } => {
                assert_eq!((pass, fail, error), (3, 1, 0));
                assert!(no_save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_file() {
        let args = Args::parse_from(["achievements", "list", "--file", "/tmp/store.json"]);
        assert_eq!(args.file, Some(PathBuf::from("/tmp/store.json")));
        assert!(matches!(args.command, Command::List));
    }
}
