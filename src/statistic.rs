//! Repeated trials and averaged measurements.
//!
//! A [`TrialPipeline`] describes one trial: obtain an automaton, optionally
//! convert it to a single acceptance set, then run a list of checkers on the
//! converted (NBA) automaton and, if a conversion actually happened, another
//! list on the original generalized (NGA) automaton. Each run is timed.
//!
//! Results go into a [`StatisticAccumulator`] owned by the caller. It is passed
//! into [`TrialPipeline::run`] and handed back, so several batches can feed the
//! same accumulator. [`StatisticAccumulator::finish`] turns it into an
//! immutable [`OneStepStatistic`] with per-field averages.
//!
//! A trial that fails (structural error while building or converting, or an
//! inconclusive verdict) is counted in `failed` and contributes to no average.
//!
//! ```
//! use buchi_rs::check::Algorithm;
//! use buchi_rs::degeneralize::to_single_set;
//! use buchi_rs::generator::GeneratorOptions;
//! use buchi_rs::statistic::{StatisticAccumulator, TrialPipeline};
//!
//! let opts = GeneratorOptions { states: 30, sets: 2, ..Default::default() };
//! let mut pipeline = TrialPipeline::generated(opts)
//!     .with_conversion(to_single_set)
//!     .with_algorithms(&Algorithm::ALL);
//! let stats = pipeline.run(5, StatisticAccumulator::default()).finish();
//! assert_eq!(stats.trials, 5);
//! assert!(stats.different_results.is_empty());
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;

use crate::automaton::Automaton;
use crate::check::{Algorithm, StepLimit, Unbounded, Verdict};
use crate::error::{ResourceExhausted, StructuralError};
use crate::generator::{generate, GeneratorOptions};

type GenerateFn<'a> = Box<dyn FnMut(usize) -> Result<Automaton, StructuralError> + 'a>;
type ConvertFn<'a> = Box<dyn Fn(&Automaton) -> Result<Option<Automaton>, StructuralError> + 'a>;

/// Why a trial was excluded from the averages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrialFailure {
    #[error("invalid automaton: {0}")]
    Structural(#[from] StructuralError),

    #[error("{algorithm} was inconclusive: {reason}")]
    Inconclusive {
        algorithm: Algorithm,
        reason: ResourceExhausted,
    },
}

/// Timed answer of one checker in one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub algorithm: Algorithm,
    pub empty: bool,
    pub duration: Duration,
}

/// Measurements of one successful trial.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub generation: Duration,
    /// Present iff the conversion produced a new automaton.
    pub conversion: Option<Duration>,
    /// States and transitions of the automaton given to the NBA checkers.
    pub nba_size: (usize, usize),
    /// States and transitions of the generalized automaton, if it was converted.
    pub nga_size: Option<(usize, usize)>,
    pub nba: Vec<Run>,
    pub nga: Vec<Run>,
}

impl TrialOutcome {
    fn answers_agree(&self) -> bool {
        let mut answers = self.nba.iter().chain(&self.nga).map(|r| r.empty);
        match answers.next() {
            Some(first) => answers.all(|a| a == first),
            None => true,
        }
    }
}

/// A trial whose checkers did not all give the same answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub trial: usize,
    /// `(algorithm, is_empty)` on the single-set automaton.
    pub nba: Vec<(Algorithm, bool)>,
    /// `(algorithm, is_empty)` on the generalized automaton.
    pub nga: Vec<(Algorithm, bool)>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |runs: &[(Algorithm, bool)]| {
            runs.iter()
                .map(|(a, e)| format!("{}={}", a, if *e { "empty" } else { "nonempty" }))
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(f, "trial {}: nba [{}] nga [{}]", self.trial, show(&self.nba), show(&self.nga))
    }
}

/// Describes how each trial obtains, converts and checks an automaton.
pub struct TrialPipeline<'a> {
    generate: GenerateFn<'a>,
    convert: Option<ConvertFn<'a>>,
    nba_algorithms: Vec<Algorithm>,
    nga_algorithms: Vec<Algorithm>,
    step_limit: Option<u64>,
}

impl<'a> TrialPipeline<'a> {
    /// Pipeline obtaining the automaton of trial `i` from `generate(i)`.
    pub fn new(generate: impl FnMut(usize) -> Result<Automaton, StructuralError> + 'a) -> Self {
        Self {
            generate: Box::new(generate),
            convert: None,
            nba_algorithms: vec![Algorithm::NestedDfs],
            nga_algorithms: Vec::new(),
            step_limit: None,
        }
    }

    /// Pipeline generating random automata; trial `i` uses seed `opts.seed + i`.
    pub fn generated(opts: GeneratorOptions) -> Self {
        Self::new(move |trial| {
            generate(&GeneratorOptions {
                seed: opts.seed.wrapping_add(trial as u64),
                ..opts
            })
        })
    }

    /// Converts each automaton before the NBA checkers run.
    /// A conversion returning `None` means the automaton is used as is.
    pub fn with_conversion(
        mut self,
        convert: impl Fn(&Automaton) -> Result<Option<Automaton>, StructuralError> + 'a,
    ) -> Self {
        self.convert = Some(Box::new(convert));
        self
    }

    /// Runs `algorithms` on both the converted and the generalized automaton.
    pub fn with_algorithms(mut self, algorithms: &[Algorithm]) -> Self {
        self.nba_algorithms = algorithms.to_vec();
        self.nga_algorithms = algorithms.to_vec();
        self
    }

    pub fn with_nba_algorithms(mut self, algorithms: &[Algorithm]) -> Self {
        self.nba_algorithms = algorithms.to_vec();
        self
    }

    pub fn with_nga_algorithms(mut self, algorithms: &[Algorithm]) -> Self {
        self.nga_algorithms = algorithms.to_vec();
        self
    }

    /// Bounds every checker run to `limit` state expansions.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Runs `repetitions` trials, recording them into `acc`.
    pub fn run(&mut self, repetitions: usize, mut acc: StatisticAccumulator) -> StatisticAccumulator {
        info!("running {} trials", repetitions);
        for _ in 0..repetitions {
            let trial = acc.trials;
            match self.run_trial(trial) {
                Ok(outcome) => acc.record(outcome),
                Err(e) => {
                    warn!("trial {} excluded: {}", trial, e);
                    acc.record_failure();
                }
            }
        }
        info!(
            "{} trials done ({} failed, {} differences)",
            acc.trials,
            acc.failed,
            acc.different.len()
        );
        acc
    }

    /// Runs a single trial.
    pub fn run_trial(&mut self, trial: usize) -> Result<TrialOutcome, TrialFailure> {
        let start = Instant::now();
        let nga = (self.generate)(trial)?;
        let generation = start.elapsed();

        let (converted, conversion) = match &self.convert {
            Some(convert) => {
                let start = Instant::now();
                let res = convert(&nga)?;
                let elapsed = start.elapsed();
                match res {
                    Some(nba) => (Some(nba), Some(elapsed)),
                    None => (None, None),
                }
            }
            None => (None, None),
        };
        let worker = converted.as_ref().unwrap_or(&nga);

        let nba = self.check_all(&self.nba_algorithms, worker)?;
        let nga_runs = match converted {
            Some(_) => self.check_all(&self.nga_algorithms, &nga)?,
            None => Vec::new(),
        };
        debug!(
            "trial {}: {} states / {} transitions checked by {} + {} runs",
            trial,
            worker.num_states(),
            worker.num_transitions(),
            nba.len(),
            nga_runs.len()
        );

        Ok(TrialOutcome {
            generation,
            conversion,
            nba_size: (worker.num_states(), worker.num_transitions()),
            nga_size: conversion.map(|_| (nga.num_states(), nga.num_transitions())),
            nba,
            nga: nga_runs,
        })
    }

    fn check_all(&self, algorithms: &[Algorithm], aut: &Automaton) -> Result<Vec<Run>, TrialFailure> {
        algorithms
            .iter()
            .map(|&algorithm| {
                let start = Instant::now();
                let verdict = match self.step_limit {
                    Some(limit) => algorithm.check_with_budget(aut, &mut StepLimit::new(limit)),
                    None => algorithm.check_with_budget(aut, &mut Unbounded),
                };
                let duration = start.elapsed();
                match verdict {
                    Verdict::Inconclusive(reason) => Err(TrialFailure::Inconclusive { algorithm, reason }),
                    v => Ok(Run {
                        algorithm,
                        empty: v.is_empty(),
                        duration,
                    }),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Totals {
    algorithm: Algorithm,
    empty: usize,
    runs: usize,
    duration: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
struct SizeTotals {
    count: usize,
    states: usize,
    transitions: usize,
}

impl SizeTotals {
    fn add(&mut self, (states, transitions): (usize, usize)) {
        self.count += 1;
        self.states += states;
        self.transitions += transitions;
    }

    fn average(&self) -> AverageSize {
        if self.count == 0 {
            return AverageSize::default();
        }
        AverageSize {
            states: self.states as f64 / self.count as f64,
            transitions: self.transitions as f64 / self.count as f64,
        }
    }
}

/// Running totals of a batch of trials.
#[derive(Debug, Clone, Default)]
pub struct StatisticAccumulator {
    trials: usize,
    failed: usize,
    generation: Duration,
    conversions: usize,
    conversion: Duration,
    nba: Vec<Totals>,
    nga: Vec<Totals>,
    nba_size: SizeTotals,
    nga_size: SizeTotals,
    different: Vec<Difference>,
}

impl StatisticAccumulator {
    /// Number of trials recorded so far, failed ones included.
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn record(&mut self, outcome: TrialOutcome) {
        let trial = self.trials;
        self.trials += 1;
        self.generation += outcome.generation;
        if let Some(d) = outcome.conversion {
            self.conversions += 1;
            self.conversion += d;
        }
        self.nba_size.add(outcome.nba_size);
        if let Some(size) = outcome.nga_size {
            self.nga_size.add(size);
        }
        add_runs(&mut self.nba, &outcome.nba);
        add_runs(&mut self.nga, &outcome.nga);

        if !outcome.answers_agree() {
            let pairs = |runs: &[Run]| runs.iter().map(|r| (r.algorithm, r.empty)).collect();
            let diff = Difference {
                trial,
                nba: pairs(&outcome.nba),
                nga: pairs(&outcome.nga),
            };
            warn!("checkers disagree: {}", diff);
            self.different.push(diff);
        }
    }

    pub fn record_failure(&mut self) {
        self.trials += 1;
        self.failed += 1;
    }

    /// Averages everything recorded so far.
    pub fn finish(self) -> OneStepStatistic {
        let successful = self.trials - self.failed;
        let averages = |totals: &[Totals]| {
            totals
                .iter()
                .map(|t| AlgorithmAverage {
                    algorithm: t.algorithm,
                    empty: t.empty,
                    runs: t.runs,
                    duration: average(t.duration, t.runs),
                })
                .collect()
        };
        OneStepStatistic {
            trials: self.trials,
            failed: self.failed,
            average_generation: average(self.generation, successful),
            average_conversion: (self.conversions, average(self.conversion, self.conversions)),
            average_nba: averages(&self.nba),
            average_nga: averages(&self.nga),
            average_nba_size: self.nba_size.average(),
            average_nga_size: self.nga_size.average(),
            different_results: self.different,
        }
    }
}

fn add_runs(totals: &mut Vec<Totals>, runs: &[Run]) {
    for (i, run) in runs.iter().enumerate() {
        if i == totals.len() {
            totals.push(Totals {
                algorithm: run.algorithm,
                empty: 0,
                runs: 0,
                duration: Duration::ZERO,
            });
        }
        let t = &mut totals[i];
        debug_assert_eq!(t.algorithm, run.algorithm);
        t.runs += 1;
        t.duration += run.duration;
        if run.empty {
            t.empty += 1;
        }
    }
}

fn average(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => total.div_f64(count as f64),
    }
}

/// Per-algorithm average over the successful trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmAverage {
    pub algorithm: Algorithm,
    /// Number of runs answering EMPTY.
    pub empty: usize,
    pub runs: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AverageSize {
    pub states: f64,
    pub transitions: f64,
}

/// Finalized averages of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct OneStepStatistic {
    pub trials: usize,
    pub failed: usize,
    pub average_generation: Duration,
    /// Number of conversions that produced a new automaton, and their average time.
    pub average_conversion: (usize, Duration),
    pub average_nba: Vec<AlgorithmAverage>,
    pub average_nga: Vec<AlgorithmAverage>,
    pub average_nba_size: AverageSize,
    pub average_nga_size: AverageSize,
    pub different_results: Vec<Difference>,
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::degeneralize::to_single_set;
    use crate::types::StateId;

    fn opts() -> GeneratorOptions {
        GeneratorOptions {
            states: 25,
            trees: 2,
            sets: 3,
            edges: 2,
            seed: 11,
        }
    }

    #[test]
    fn test_batch_with_conversion() {
        let mut pipeline = TrialPipeline::generated(opts())
            .with_conversion(to_single_set)
            .with_algorithms(&Algorithm::ALL);
        let stats = pipeline.run(6, StatisticAccumulator::default()).finish();

        assert_eq!(stats.trials, 6);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.average_conversion.0, 6);
        assert_eq!(stats.average_nba.len(), 3);
        assert_eq!(stats.average_nga.len(), 3);
        assert!(stats.average_nba.iter().all(|a| a.runs == 6));
        let empty = stats.average_nba[0].empty;
        assert!(stats.average_nba.iter().chain(&stats.average_nga).all(|a| a.empty == empty));
        assert!(stats.different_results.is_empty());
        assert!(stats.average_nga_size.states == 25.0);
        assert!(stats.average_nba_size.states >= 1.0);
    }

    #[test]
    fn test_no_conversion_for_single_set() {
        let single = GeneratorOptions { sets: 1, ..opts() };
        let mut pipeline = TrialPipeline::generated(single)
            .with_conversion(to_single_set)
            .with_algorithms(&Algorithm::ALL);
        let stats = pipeline.run(3, StatisticAccumulator::default()).finish();
        assert_eq!(stats.average_conversion, (0, Duration::ZERO));
        assert!(stats.average_nga.is_empty());
        assert_eq!(stats.average_nba_size.states, 25.0);
    }

    #[test]
    fn test_failed_trials_are_excluded() {
        let mut pipeline = TrialPipeline::new(|trial| {
            if trial % 2 == 0 {
                Automaton::new(100)
            } else {
                let mut aut = Automaton::with_states(1, 1)?;
                aut.add_initial(StateId::new(0))?;
                aut.add_transition_sets(StateId::new(0), StateId::new(0), [0])?;
                Ok(aut)
            }
        });
        let stats = pipeline.run(4, StatisticAccumulator::default()).finish();
        assert_eq!(stats.trials, 4);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.average_nba.len(), 1);
        assert_eq!(stats.average_nba[0].runs, 2);
        assert_eq!(stats.average_nba[0].empty, 0);
    }

    #[test]
    fn test_inconclusive_trial_fails() {
        let mut pipeline = TrialPipeline::generated(opts()).with_step_limit(1);
        let err = pipeline.run_trial(0).unwrap_err();
        assert!(matches!(err, TrialFailure::Inconclusive { .. }));
    }

    #[test]
    fn test_accumulator_is_reused() {
        let mut pipeline = TrialPipeline::generated(opts());
        let acc = pipeline.run(2, StatisticAccumulator::default());
        let acc = pipeline.run(3, acc);
        assert_eq!(acc.trials(), 5);
        assert_eq!(acc.failed(), 0);
        assert_eq!(acc.finish().average_nba[0].runs, 5);
    }

    #[test]
    fn test_difference_recorded() {
        let mut acc = StatisticAccumulator::default();
        let run = |algorithm, empty| Run {
            algorithm,
            empty,
            duration: Duration::from_millis(1),
        };
        acc.record(TrialOutcome {
            generation: Duration::from_millis(2),
            conversion: None,
            nba_size: (1, 1),
            nga_size: None,
            nba: vec![run(Algorithm::NestedDfs, true), run(Algorithm::EmersonLei, false)],
            nga: vec![],
        });
        let stats = acc.finish();
        assert_eq!(stats.different_results.len(), 1);
        assert_eq!(
            stats.different_results[0].to_string(),
            "trial 0: nba [nested-dfs=empty emerson-lei=nonempty] nga []"
        );
        assert_eq!(stats.average_generation, Duration::from_millis(2));
    }
}
