//! Command-line driver: `satisfy -S<n> <cnf_path>`.
//!
//! `n` selects the decision procedure (1: DPLL, 2: CDCL+CHB, 3: CDCL+EVSIDS). Exit code 0 means
//! a decision was reached (SAT or UNSAT); a malformed argument or I/O failure exits non-zero
//! without attempting to solve.
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Error};
use clap::{App, Arg};
use log::info;

use satisfy_core::{solve_dpll, Chb, CdclResult, DpllResult, Evsids, Solver, Status};
use satisfy_formula::Lit;

const DPLL_STRATEGY: u32 = 1;
const CDCL_CHB_STRATEGY: u32 = 2;
const CDCL_EVSIDS_STRATEGY: u32 = 3;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter("SATISFY_LOG"))
        .format(|buf, record| {
            if record.level() == log::Level::Info {
                writeln!(buf, "c {}", record.args())
            } else {
                writeln!(buf, "c {}: {}", record.level(), record.args())
            }
        })
        .filter_level(log::LevelFilter::Info)
        .init();
}

fn main() {
    init_logging();

    match run() {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("c error: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    let matches = App::new("satisfy")
        .about("Solves a DIMACS CNF formula with DPLL or CDCL")
        .arg(
            Arg::with_name("strategy")
                .short("S")
                .takes_value(true)
                .required(true)
                .value_name("n")
                .help("1 = DPLL, 2 = CDCL+CHB, 3 = CDCL+EVSIDS"),
        )
        .arg(
            Arg::with_name("INPUT")
                .required(true)
                .help("Path to a DIMACS CNF file"),
        )
        .get_matches();

    let strategy: u32 = matches
        .value_of("strategy")
        .unwrap()
        .parse()
        .map_err(|_| anyhow!("strategy must be 1, 2 or 3"))?;

    if strategy == 0 || strategy > CDCL_EVSIDS_STRATEGY {
        return Err(anyhow!(
            "strategy should be specified as '-Sn', where n is 1 (DPLL), 2 (CDCL - CHB), or 3 (CDCL - EVSIDS)"
        ));
    }

    let input_path = matches.value_of("INPUT").unwrap();

    let file = File::open(input_path)
        .with_context(|| format!("failed to open '{}'", input_path))?;
    let (formula, _header) =
        satisfy_dimacs::parse(file).with_context(|| format!("failed to parse '{}'", input_path))?;

    info!("read formula with {} variables", formula.var_count());

    let (satisfiable, assignment) = match strategy {
        DPLL_STRATEGY => {
            info!("solving with DPLL");
            let DpllResult { status, assignment, stats } = solve_dpll(formula);
            info!("{:?}", stats);
            (status == Status::Satisfiable, assignment)
        }
        CDCL_CHB_STRATEGY => {
            info!("solving with CDCL using CHB heuristics");
            let solver = Solver::new(formula, Chb::new());
            let CdclResult { status, assignment, stats } = solver.solve();
            info!("{:?}", stats);
            (status == Status::Satisfiable, assignment)
        }
        CDCL_EVSIDS_STRATEGY => {
            info!("solving with CDCL using EVSIDS heuristics");
            let solver = Solver::new(formula, Evsids::new());
            let CdclResult { status, assignment, stats } = solver.solve();
            info!("{:?}", stats);
            (status == Status::Satisfiable, assignment)
        }
        _ => unreachable!("checked above"),
    };

    if satisfiable {
        println!("SATISFIABLE");
        write_output(input_path, &assignment)?;
    } else {
        println!("UNSATISFIABLE");
    }

    Ok(())
}

/// Writes the satisfying assignment to `<cnf_path>.out`, one literal per line followed by
/// ` 0 \n`, the format the Sudoku decoder consumes downstream.
fn write_output(cnf_path: &str, assignment: &[Lit]) -> io::Result<()> {
    let out_path = format!("{}.out", cnf_path);
    let mut out = File::create(Path::new(&out_path))?;

    for lit in assignment {
        write!(out, "{} 0 \n", lit.to_dimacs())?;
    }

    Ok(())
}
