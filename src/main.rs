//! Scenario runner CLI
//!
//! Usage:
//!   cargo run                        # Run everything
//!   cargo run -- spare               # Run scenarios whose name contains "spare"
//!   cargo run -- --verbose           # Show details on failure
//!   cargo run -- --json report.json  # Also write a JSON report
//!   cargo run -- --db runs.db --history bowling/perfect_game

use std::env;
use std::path::Path;
use tracing::{error, info, warn};

use givenspec::config::{USAGE, help_requested};
use givenspec::constants::HISTORY_LIMIT;
use givenspec::testing::{ResultDatabase, RunOptions, ScenarioRegistry, print_report, register_scenario_files};
use givenspec::{LogConfig, RunnerConfig, register_bowling_specs};

fn main() {
    let args: Vec<String> = env::args().collect();

    if help_requested(&args) {
        println!("{}", USAGE);
        return;
    }

    LogConfig::load_with_args(&args).init();

    let config = match RunnerConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if let Some(name) = &config.history {
        show_history(name, config.db_path.as_deref());
        return;
    }

    let mut registry = ScenarioRegistry::new();

    if config.builtin {
        if let Err(e) = register_bowling_specs(&mut registry) {
            warn!("Built-in scenarios: {}", e);
        }
    }

    let scenarios_dir = Path::new(&config.scenarios_dir);
    if scenarios_dir.exists() {
        register_scenario_files(&mut registry, scenarios_dir);
    } else {
        info!("No scenarios directory at {}", scenarios_dir.display());
    }

    if registry.is_empty() {
        println!("No scenarios found.");
        println!("Create scenario files in {}/", config.scenarios_dir);
        std::process::exit(1);
    }

    let report = registry.run(&RunOptions {
        filter: config.filter.clone(),
        parallel: config.parallel,
    });

    if report.scenarios.is_empty() {
        println!("No scenarios matched.");
        if let Some(f) = &config.filter {
            println!("Filter: {}", f);
        }
        std::process::exit(1);
    }

    if !config.quiet {
        print_report(&report, config.verbose);
    }

    if let Some(path) = &config.json_output {
        match report.write_json(Path::new(path)) {
            Ok(()) => info!("Report written to {}", path),
            Err(e) => error!("Failed to write report to {}: {}", path, e),
        }
    }

    if let Some(path) = &config.db_path {
        let stored = ResultDatabase::open(Path::new(path)).and_then(|mut db| db.insert_run(&report));
        match stored {
            Ok(run_id) => info!("Stored run {} in {}", run_id, path),
            Err(e) => error!("Failed to store run in {}: {}", path, e),
        }
    }

    std::process::exit(report.exit_code());
}

fn show_history(name: &str, db_path: Option<&str>) {
    let Some(path) = db_path else {
        eprintln!("--history needs a database: pass --db <PATH>");
        std::process::exit(2);
    };

    let history = ResultDatabase::open(Path::new(path)).and_then(|db| db.format_history(name, HISTORY_LIMIT));
    match history {
        Ok(text) => print!("{}", text),
        Err(e) => {
            error!("Failed to read history from {}: {}", path, e);
            std::process::exit(1);
        }
    }
}
