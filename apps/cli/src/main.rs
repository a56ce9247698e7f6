#![deny(warnings)]

//! Headless driver: loads a scenario, ticks the simulation once per simulated
//! second and optionally lets a seeded autopilot play.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use sim_core::{ComponentKind, RoomType, SoftwareKind, UnitStatus};
use sim_econ::HardwareTarget;
use sim_runtime::{components_by_kind, BuildQueue, Command, GameConfig, GameState};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "dc-tycoon", about = "Headless datacenter tycoon simulation", version = VERSION)]
struct Args {
    /// Scenario YAML; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 600)]
    seconds: u32,

    /// Let a random player issue commands
    #[arg(long)]
    autopilot: bool,

    /// Autopilot seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the final state as JSON instead of a KPI line
    #[arg(long)]
    json: bool,
}

/// Buys a random available part of each kind `target` needs, sometimes the
/// best PSU too, and starts the build. Skips the turn when the whole
/// selection is unaffordable.
fn autobuild(
    state: &mut GameState,
    rng: &mut ChaCha8Rng,
    target: HardwareTarget,
    now: chrono::DateTime<Utc>,
) {
    let groups = components_by_kind(state.available_components());
    let mut wanted: Vec<_> = target
        .required_kinds()
        .iter()
        .filter_map(|kind| groups.get(kind))
        .map(|group| group[rng.gen_range(0..group.len())].id.clone())
        .collect();
    if rng.gen_bool(0.5) {
        if let Some(psu) = groups.get(&ComponentKind::PSU).and_then(|g| g.last()) {
            wanted.push(psu.id.clone());
        }
    }
    let cost: Decimal = wanted
        .iter()
        .filter_map(|id| state.catalog().iter().find(|c| &c.id == id))
        .map(|c| c.cost)
        .sum();
    if cost > state.money() {
        return;
    }

    let mut queue = BuildQueue::new();
    for id in &wanted {
        if let Err(e) = queue.add(state, id) {
            debug!(%id, error = %e, "autopilot purchase failed");
            return;
        }
    }
    let built = match target {
        HardwareTarget::Server => queue.build_server(state, now),
        HardwareTarget::Pc => queue.build_pc(state, now),
    };
    if let Err(e) = built {
        debug!(error = %e, "autopilot build failed");
    }
}

/// One autopilot decision per tick.
fn autopilot_step(state: &mut GameState, rng: &mut ChaCha8Rng, now: chrono::DateTime<Utc>) {
    let roll: u32 = rng.gen_range(0..100);
    let command = match roll {
        0..=39 => {
            let target = if rng.gen_bool(0.7) {
                HardwareTarget::Server
            } else {
                HardwareTarget::Pc
            };
            autobuild(state, rng, target, now);
            return;
        }
        40..=49 => {
            let Some(upgrade) = state
                .upgrades()
                .iter()
                .filter(|u| !u.applied && u.cost <= state.money())
                .min_by_key(|u| u.cost)
            else {
                return;
            };
            Command::PurchaseUpgrade(upgrade.id.clone())
        }
        50..=54 => {
            let kinds = [RoomType::Server, RoomType::Pc, RoomType::Software];
            let kind = kinds[rng.gen_range(0..kinds.len())];
            let x = i32::try_from(state.rooms().len()).unwrap_or(i32::MAX);
            Command::PurchaseRoom {
                kind,
                position: (x, 0),
            }
        }
        55..=59 => {
            let kinds = [
                SoftwareKind::OS,
                SoftwareKind::Productivity,
                SoftwareKind::Security,
                SoftwareKind::Development,
            ];
            let kind = kinds[rng.gen_range(0..kinds.len())];
            Command::DevelopSoftware {
                name: format!("Project {}", state.software().count() + 1),
                kind,
                developers: rng.gen_range(1..=3),
            }
        }
        60..=64 => {
            let offline: Vec<_> = state
                .units()
                .filter(|u| u.status == UnitStatus::Offline)
                .map(|u| u.id)
                .collect();
            if offline.is_empty() {
                return;
            }
            Command::Restart(offline[rng.gen_range(0..offline.len())])
        }
        65..=66 => {
            let Some(room) = state.rooms().iter().min_by_key(|r| r.air_conditioning.level) else {
                return;
            };
            Command::UpgradeAirConditioning(room.id)
        }
        _ => return,
    };
    match state.execute(command.clone(), now) {
        Ok(outcome) => debug!(?command, ?outcome, "autopilot"),
        Err(e) => debug!(?command, error = %e, "autopilot command rejected"),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    info!(
        config = ?args.config,
        seconds = args.seconds,
        autopilot = args.autopilot,
        "starting CLI"
    );

    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => GameConfig::default(),
    };

    let start = Utc::now();
    let mut state = GameState::new(&config, start);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut completed = 0usize;
    let mut shut_down = 0usize;

    for second in 1..=i64::from(args.seconds) {
        let now = start + Duration::seconds(second);
        if args.autopilot {
            autopilot_step(&mut state, &mut rng, now);
        }
        let report = state.advance_in_place(now);
        completed += report.completed.len();
        shut_down += report.shut_down.len();
    }

    if args.json {
        let snapshot = state.snapshot().context("serializing state")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "KPI | {} | money: {} | revenue/s: {} | power: {}/{} W | \
         units: {} (servers {}, pcs {}, software {}) | \
         rooms: {} | tier: {} | completed: {} | auto-shutdowns: {}",
        state.formatted_game_time(),
        state.money().round_dp(2),
        state.revenue_rate().round_dp(2),
        state.power_usage().round_dp(1),
        state.power_capacity(),
        state.units().count(),
        state.servers().count(),
        state.pcs().count(),
        state.software().count(),
        state.rooms().len(),
        state.unlocked_tier(),
        completed,
        shut_down,
    );

    Ok(())
}
