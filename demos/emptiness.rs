//! Command-line front end for the emptiness checkers.
//!
//! Run with:
//!   cargo run --example emptiness -- check automaton.gba --algorithm two-stack
//!   cargo run --example emptiness -- stats --states 200 --sets 3 --repetitions 20
//!   cargo run --example emptiness -- dot automaton.gba > automaton.dot

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use buchi_rs::check::{Algorithm, Budget, StepLimit, Unbounded};
use buchi_rs::degeneralize::to_single_set;
use buchi_rs::dot::{to_dot, DotConfig};
use buchi_rs::format;
use buchi_rs::generator::GeneratorOptions;
use buchi_rs::statistic::{OneStepStatistic, StatisticAccumulator, TrialPipeline};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the automaton stored in a file.
    Check {
        /// Automaton in the text format.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Algorithm to run; all of them if omitted.
        #[arg(long, value_name = "NAME")]
        algorithm: Option<Algorithm>,

        /// Maximum number of state expansions.
        #[arg(long, value_name = "INT")]
        steps: Option<u64>,
    },

    /// Compare the algorithms on random automata.
    Stats {
        #[arg(long, value_name = "INT", default_value = "100")]
        states: usize,

        #[arg(long, value_name = "INT", default_value = "3")]
        trees: usize,

        #[arg(long, value_name = "INT", default_value = "2")]
        sets: usize,

        #[arg(long, value_name = "INT", default_value = "2")]
        edges: usize,

        /// Number of trials.
        #[arg(long, value_name = "INT", default_value = "10")]
        repetitions: usize,

        #[arg(long, value_name = "INT", default_value = "0")]
        seed: u64,
    },

    /// Print the automaton (and a witness, if any) in DOT format.
    Dot {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Algorithm used to find the highlighted witness.
        #[arg(long, value_name = "NAME", default_value = "two-stack-dfs")]
        algorithm: Algorithm,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    info!("args = {:?}", args);

    match args.command {
        Command::Check { path, algorithm, steps } => {
            let aut = format::load(&path)?;
            println!("aut = {:?}", aut);
            let algorithms = match algorithm {
                Some(alg) => vec![alg],
                None => Algorithm::ALL.to_vec(),
            };
            for alg in algorithms {
                let time = std::time::Instant::now();
                let mut budget: Box<dyn Budget> = match steps {
                    Some(limit) => Box::new(StepLimit::new(limit)),
                    None => Box::new(Unbounded),
                };
                let verdict = alg.check_with_budget(&aut, budget.as_mut());
                println!("{}: {} in {:.3}ms", alg, verdict, time.elapsed().as_secs_f64() * 1000.0);
                if let Some(lasso) = verdict.witness() {
                    lasso.validate(&aut)?;
                }
            }
        }

        Command::Stats {
            states,
            trees,
            sets,
            edges,
            repetitions,
            seed,
        } => {
            let opts = GeneratorOptions {
                states,
                trees,
                sets,
                edges,
                seed,
            };
            let mut pipeline = TrialPipeline::generated(opts)
                .with_conversion(to_single_set)
                .with_algorithms(&Algorithm::ALL);
            let stats = pipeline.run(repetitions, StatisticAccumulator::default()).finish();
            print_stats(&stats);
        }

        Command::Dot { path, algorithm } => {
            let aut = format::load(&path)?;
            let verdict = algorithm.check(&aut);
            print!("{}", to_dot(&aut, verdict.witness(), &DotConfig::default())?);
        }
    }

    Ok(())
}

fn print_stats(stats: &OneStepStatistic) {
    println!("trials: {} ({} failed)", stats.trials, stats.failed);
    println!("generation: {:?}", stats.average_generation);
    println!(
        "conversion: {:?} ({} conversions)",
        stats.average_conversion.1, stats.average_conversion.0
    );
    println!(
        "size: nba {:.1} states / {:.1} transitions, nga {:.1} states / {:.1} transitions",
        stats.average_nba_size.states,
        stats.average_nba_size.transitions,
        stats.average_nga_size.states,
        stats.average_nga_size.transitions
    );
    for (label, averages) in [("nba", &stats.average_nba), ("nga", &stats.average_nga)] {
        for a in averages.iter() {
            println!(
                "{} {:>14}: {:?} per run, {}/{} empty",
                label, a.algorithm, a.duration, a.empty, a.runs
            );
        }
    }
    for diff in &stats.different_results {
        println!("DIFFERENCE {}", diff);
    }
}
