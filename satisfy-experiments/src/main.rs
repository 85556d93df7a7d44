//! Batch-solves a file of Sudoku puzzles against a rules CNF and writes one CSV row per puzzle,
//! the counterpart of `experiment_runner.py`'s `main`.
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Error};
use clap::{App, Arg};
use log::info;

use satisfy_experiments::solve_all;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter("SATISFY_LOG"))
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let matches = App::new("satisfy-experiments")
        .about("Solves a batch of Sudoku puzzles with every strategy and aggregates statistics")
        .arg(
            Arg::with_name("rules")
                .long("rules")
                .takes_value(true)
                .required(true)
                .help("DIMACS CNF file with the Sudoku row/column/box/cell rules"),
        )
        .arg(
            Arg::with_name("puzzles")
                .long("puzzles")
                .takes_value(true)
                .required(true)
                .help("File with one 81-character Sudoku puzzle string per line"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .takes_value(true)
                .default_value("experiment_result_9x9.csv")
                .help("Path the aggregated CSV is written to"),
        )
        .arg(
            Arg::with_name("workers")
                .long("workers")
                .takes_value(true)
                .help("Worker thread count (defaults to available parallelism)"),
        )
        .get_matches();

    let rules_path = matches.value_of("rules").unwrap();
    let rules_file =
        File::open(rules_path).with_context(|| format!("failed to open '{}'", rules_path))?;
    let (rules, _header) = satisfy_dimacs::parse(rules_file)
        .with_context(|| format!("failed to parse '{}'", rules_path))?;

    let puzzles_path = matches.value_of("puzzles").unwrap();
    let puzzles_file =
        File::open(puzzles_path).with_context(|| format!("failed to open '{}'", puzzles_path))?;
    let puzzles: Vec<String> = BufReader::new(puzzles_file)
        .lines()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect();

    let workers = match matches.value_of("workers") {
        Some(value) => value.parse().context("workers must be a positive integer")?,
        None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };

    info!("solving {} puzzles with {} workers", puzzles.len(), workers);

    let results = solve_all(&puzzles, &rules, workers);

    let output_path = matches.value_of("output").unwrap();
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("failed to create '{}'", output_path))?;

    let mut failures = 0;
    for result in results {
        match result {
            Ok(record) => writer.serialize(record)?,
            Err(err) => {
                failures += 1;
                eprintln!("c puzzle failed: {:#}", err);
            }
        }
    }
    writer.flush()?;

    info!("wrote '{}' ({} puzzles failed)", output_path, failures);

    Ok(())
}
