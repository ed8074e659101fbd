//! Bowling scorecard CLI
//!
//! Usage:
//!   cargo run --bin score -- 10 10 10 10 10 10 10 10 10 10 10 10
//!   cargo run --bin score -- 4 6 3 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0

use std::env;

use givenspec::{LogConfig, Scorecard, roll_game};
use tracing::debug;

fn main() {
    let args: Vec<String> = env::args().collect();
    LogConfig::load_with_args(&args).init();

    let mut rolls = Vec::new();
    for arg in args.iter().skip(1).filter(|a| !a.starts_with("--")) {
        match arg.parse::<u32>() {
            Ok(pins) => rolls.push(pins),
            Err(_) => {
                eprintln!("Invalid roll '{}': expected a pin count from 0 to 10", arg);
                std::process::exit(1);
            }
        }
    }

    if rolls.is_empty() {
        eprintln!("Usage: score <pins> <pins> ...");
        std::process::exit(1);
    }
    debug!("Scoring {} rolls", rolls.len());

    match roll_game(&rolls).and_then(|game| game.scorecard()) {
        Ok(card) => print_scorecard(&card),
        Err(e) => {
            eprintln!("Cannot score game: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_scorecard(card: &Scorecard) {
    println!("Frame  Rolls       Kind     Frame  Total");
    for frame in &card.frames {
        let rolls = frame
            .rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:>5}  {:<10}  {:<7}  {:>5}  {:>5}",
            frame.number, rolls, frame.kind, frame.frame_total, frame.running_total
        );
    }
    println!("\nScore: {}", card.total);
}
