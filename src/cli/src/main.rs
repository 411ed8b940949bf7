#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

use std::{path::PathBuf, time::Instant};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::{eyre::eyre, owo_colors::OwoColorize};
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info};
use threephase::{Alg, FaceletCube, Solver, SolverConfig};

/// Solves the 4x4x4 Rubik's Revenge by reduction
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Solver limits, in TOML format
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    log_level: u8,

    /// Print only the solution, one line per cube
    #[arg(long)]
    batch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve random cubes
    Random {
        /// How many cubes to solve
        #[arg(default_value_t = 1)]
        count: usize,
        /// Seed for the scrambles, random if not given
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Solve the cube a move sequence produces, e.g. "Rw U2 r' F"
    Solve { scramble: String },
    /// Solve a cube given as 96 facelets in URFDLB order
    Facelets { facelets: String },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.log_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };

    let start = Instant::now();
    let tables = threephase::init();
    info!("Tables ready in {:.3}s", start.elapsed().as_secs_f64());
    let solver = Solver::with_config(tables, config);

    match cli.command {
        Commands::Random { count, seed } => {
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let mut times = Vec::with_capacity(count);
            let mut lengths = Vec::with_capacity(count);
            for _ in 0..count {
                let start = Instant::now();
                let state = solver.random_state(&mut rng)?;
                let elapsed = start.elapsed().as_secs_f64();
                if !cli.batch {
                    println!("{} {}", "Scramble:".bold(), state.scramble);
                    println!("{} {}", "Facelets:".bold(), state.facelets);
                }
                print_solution(&state.solution, elapsed, cli.batch);
                times.push(elapsed);
                lengths.push(state.solution.len());
            }
            if count > 1 && !cli.batch {
                println!(
                    "{} {:.1} moves, {:.3}s over {count} cubes",
                    "Average:".bold(),
                    lengths.iter().sum::<usize>() as f64 / count as f64,
                    times.iter().sum::<f64>() / count as f64
                );
                println!(
                    "{} {}",
                    "Lengths:".bold(),
                    lengths
                        .iter()
                        .counts()
                        .into_iter()
                        .sorted()
                        .map(|(len, n)| format!("{len}x{n}"))
                        .join(" ")
                );
            }
        }
        Commands::Solve { scramble } => {
            let start = Instant::now();
            let solution = solver.solve(&scramble)?;
            print_solution(&solution, start.elapsed().as_secs_f64(), cli.batch);
        }
        Commands::Facelets { facelets } => {
            let start = Instant::now();
            let cube: FaceletCube = facelets.trim().parse()?;
            let solution = solver.solve_cube(cube)?;
            if !cube.apply_alg(&solution).is_solved() {
                return Err(eyre!("The solution {solution} does not solve the cube"));
            }
            print_solution(&solution, start.elapsed().as_secs_f64(), cli.batch);
        }
    }

    Ok(())
}

fn print_solution(solution: &Alg, seconds: f64, batch: bool) {
    if batch {
        println!("{solution}");
    } else {
        let stats = format!("({} moves, {seconds:.3}s)", solution.len());
        println!("{} {solution} {}", "Solution:".bold(), stats.dimmed());
    }
}
