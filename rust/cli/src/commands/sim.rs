//! Batch simulation across worker threads.
//!
//! Rounds are split as evenly as possible over `workers` tables. Worker `i`
//! shuffles with `seed + i` and plays its rounds with its own strategy
//! instance, so an identical seed and worker count always yield identical
//! totals regardless of thread scheduling.
//!
//! # Environment Variables
//!
//! - `PONTOON_SIM_BREAK_AFTER`: stop each worker after N rounds and exit as
//!   interrupted (used to exercise partial runs)

use crate::cli::TableArgs;
use crate::commands::resolve;
use crate::error::CliError;
use crate::formatters::format_money;
use pontoon_ai::{create_strategy, play_round};
use pontoon_engine::errors::{GameError, InvalidAction};
use pontoon_engine::events::Event;
use pontoon_engine::game::{PlayerState, RoundResult};
use pontoon_engine::logger::{RoundLogger, RoundRecord};
use pontoon_engine::outcome::Outcome;
use pontoon_engine::rng::SeededRng;
use pontoon_engine::rules::Rules;
use pontoon_engine::table::Table;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

/// Options of one `sim` run after configuration is resolved.
#[derive(Debug, Clone)]
pub struct SimPlan {
    pub rounds: u64,
    pub workers: u64,
    pub seats: u64,
    pub seed: u64,
    pub rules: Rules,
    pub strategy: String,
    pub bankroll: f64,
    pub bet: f64,
    pub break_after: Option<u64>,
    pub keep_rounds: bool,
}

/// Aggregated results. Counts are per settled hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tally {
    pub rounds: u64,
    pub hands: u64,
    pub wins: u64,
    pub blackjacks: u64,
    pub losses: u64,
    pub busts: u64,
    pub pushes: u64,
    pub surrenders: u64,
    pub wagered: f64,
    pub net: f64,
}

impl Tally {
    fn record(&mut self, result: &RoundResult) {
        self.rounds += 1;
        for h in &result.hands {
            self.hands += 1;
            self.wagered += h.bet;
            match h.outcome {
                Outcome::Blackjack => self.blackjacks += 1,
                Outcome::Win => self.wins += 1,
                Outcome::Lose => self.losses += 1,
                Outcome::BustLose => self.busts += 1,
                Outcome::Push => self.pushes += 1,
                Outcome::Surrender => self.surrenders += 1,
            }
        }
        self.wagered += result.insurance.iter().map(|i| i.stake).sum::<f64>();
        self.net += result.net;
    }

    fn merge(&mut self, other: &Tally) {
        self.rounds += other.rounds;
        self.hands += other.hands;
        self.wins += other.wins;
        self.blackjacks += other.blackjacks;
        self.losses += other.losses;
        self.busts += other.busts;
        self.pushes += other.pushes;
        self.surrenders += other.surrenders;
        self.wagered += other.wagered;
        self.net += other.net;
    }

    /// Player loss per unit wagered; positive when the house wins.
    pub fn house_edge(&self) -> f64 {
        if self.wagered > 0.0 {
            -self.net / self.wagered
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default)]
pub struct WorkerReport {
    pub worker: u64,
    pub seed: u64,
    pub tally: Tally,
    /// Every seat ran out of money before the worker's quota
    pub broke: bool,
    pub interrupted: bool,
    pub played: Vec<(Vec<Event>, Option<RoundResult>)>,
}

/// Rounds assigned to worker `i`: the remainder goes to the first workers.
fn quota(rounds: u64, workers: u64, i: u64) -> u64 {
    rounds / workers + u64::from(i < rounds % workers)
}

fn run_worker(plan: &SimPlan, i: u64) -> Result<WorkerReport, CliError> {
    let seed = plan.seed.wrapping_add(i);
    let strategy = create_strategy(&plan.strategy).map_err(CliError::InvalidInput)?;
    let seats = (0..plan.seats)
        .map(|s| PlayerState::new(format!("w{}s{}", i, s), plan.bankroll))
        .collect();
    let mut table = Table::new(plan.rules.clone(), seats, SeededRng::new(seed))?;
    let mut report = WorkerReport {
        worker: i,
        seed,
        ..WorkerReport::default()
    };
    let target = quota(plan.rounds, plan.workers, i);

    for n in 0..target {
        if plan.break_after.is_some_and(|b| n >= b) {
            report.interrupted = true;
            break;
        }
        let events = match play_round(&mut table, strategy.as_ref(), plan.bet) {
            Ok(events) => events,
            Err(GameError::InvalidAction(InvalidAction::NoBets)) => {
                report.broke = true;
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let result = table.state().result.clone();
        if let Some(r) = &result {
            report.tally.record(r);
        }
        if plan.keep_rounds {
            report.played.push((events, result));
        }
    }
    debug!(worker = i, rounds = report.tally.rounds, net = report.tally.net, "worker finished");
    Ok(report)
}

/// Runs every worker in parallel and returns the reports in worker order.
pub fn run_plan(plan: &SimPlan) -> Result<Vec<WorkerReport>, CliError> {
    (0..plan.workers)
        .into_par_iter()
        .map(|i| run_worker(plan, i))
        .collect()
}

pub fn totals(reports: &[WorkerReport]) -> Tally {
    let mut total = Tally::default();
    for r in reports {
        total.merge(&r.tally);
    }
    total
}

#[allow(clippy::too_many_arguments)]
pub fn handle_sim_command(
    args: &TableArgs,
    rounds: u64,
    workers: u64,
    seats: u64,
    output: Option<&str>,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if rounds == 0 {
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let cfg = resolve(args)?.config;
    let break_after = std::env::var("PONTOON_SIM_BREAK_AFTER")
        .ok()
        .and_then(|v| v.parse::<u64>().ok());
    let plan = SimPlan {
        rounds,
        workers: workers.min(rounds),
        seats,
        seed: cfg.seed.unwrap_or_else(rand::random),
        rules: cfg.table_rules()?,
        strategy: cfg.strategy.clone(),
        bankroll: cfg.bankroll,
        bet: cfg.bet,
        break_after,
        keep_rounds: output.is_some(),
    };
    info!(rounds, workers = plan.workers, seed = plan.seed, "simulation started");

    let reports = run_plan(&plan)?;

    if let Some(path) = output {
        let mut logger = RoundLogger::create(path)?;
        for report in &reports {
            for (events, result) in &report.played {
                let record = RoundRecord {
                    round_id: logger.next_id(),
                    seed: Some(report.seed),
                    rules: Some(cfg.rules.clone()),
                    events: events.clone(),
                    result: result.clone(),
                    ts: None,
                    meta: Some(serde_json::json!({ "worker": report.worker })),
                };
                logger.write(&record)?;
            }
        }
    }

    let total = totals(&reports);
    for r in reports.iter().filter(|r| r.broke) {
        crate::ui::display_warning(
            err,
            &format!("worker {} stopped after {} rounds: every seat is broke", r.worker, r.tally.rounds),
        )?;
    }

    if json {
        let summary = serde_json::json!({
            "seed": plan.seed,
            "workers": plan.workers,
            "strategy": plan.strategy,
            "totals": total,
            "house_edge": total.house_edge(),
        });
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    } else {
        writeln!(
            out,
            "Simulated: {} rounds ({} workers, seed {}, strategy {})",
            total.rounds, plan.workers, plan.seed, plan.strategy
        )?;
        writeln!(out, "Hands: {}", total.hands)?;
        writeln!(
            out,
            "Wins: {} Blackjacks: {} Losses: {} Busts: {} Pushes: {} Surrenders: {}",
            total.wins, total.blackjacks, total.losses, total.busts, total.pushes, total.surrenders
        )?;
        writeln!(
            out,
            "Wagered: {} Net: {} House edge: {:.3}%",
            format_money(total.wagered),
            format_money(total.net),
            total.house_edge() * 100.0
        )?;
    }

    if reports.iter().any(|r| r.interrupted) {
        return Err(CliError::Interrupted(format!(
            "saved {}/{} rounds",
            total.rounds, rounds
        )));
    }
    Ok(())
}
