#![deny(warnings)]

//! Headless HUD host: the simulation lives in an ECS resource and a schedule
//! applies queued player commands, ticks once per simulated second and
//! refreshes the HUD.

use bevy_ecs::prelude::*;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sim_core::{Component, ComponentId, RoomType};
use sim_runtime::{Command, GameConfig, GameState, Outcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The single game instance and the clock that drives it.
#[derive(Resource)]
struct Sim {
    state: GameState,
    clock: DateTime<Utc>,
}

/// Player commands waiting for the next frame.
#[derive(Resource, Default)]
struct PendingCommands(Vec<Command>);

/// Paid-for components not yet assembled.
#[derive(Resource, Default)]
struct Basket(Vec<Component>);

#[derive(Resource, Default)]
struct HudState {
    money: Decimal,
    revenue_rate: Decimal,
    power: String,
    time: String,
    notifications: Vec<String>,
}

fn apply_commands_system(
    mut sim: ResMut<Sim>,
    mut pending: ResMut<PendingCommands>,
    mut basket: ResMut<Basket>,
    mut hud: ResMut<HudState>,
) {
    let now = sim.clock;
    for command in pending.0.drain(..) {
        match sim.state.execute(command, now) {
            Ok(Outcome::Purchased(c)) => {
                hud.notifications.push(format!("Purchased {}", c.name));
                basket.0.push(c);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "command rejected");
                hud.notifications.push(e.to_string());
            }
        }
    }
}

fn tick_system(mut sim: ResMut<Sim>, mut hud: ResMut<HudState>) {
    let now = sim.clock + Duration::seconds(1);
    sim.clock = now;
    let report = sim.state.advance_in_place(now);
    for id in report.completed {
        if let Some(unit) = sim.state.unit(id) {
            hud.notifications.push(format!("{} is online", unit.label()));
        }
    }
    for id in report.shut_down {
        hud.notifications.push(format!("{id} shut down: power capacity exceeded"));
    }
}

fn refresh_hud_system(sim: Res<Sim>, mut hud: ResMut<HudState>) {
    let state = &sim.state;
    hud.money = state.money();
    hud.revenue_rate = state.revenue_rate();
    hud.power = format!("{}/{} W", state.power_usage().round_dp(1), state.power_capacity());
    hud.time = state.formatted_game_time();
}

fn build_world(config: &GameConfig, start: DateTime<Utc>) -> (World, Schedule) {
    let mut world = World::new();
    world.insert_resource(Sim {
        state: GameState::new(config, start),
        clock: start,
    });
    world.insert_resource(PendingCommands::default());
    world.insert_resource(Basket::default());
    world.insert_resource(HudState::default());
    let mut schedule = Schedule::default();
    schedule.add_systems((apply_commands_system, tick_system, refresh_hud_system).chain());
    (world, schedule)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = GameConfig {
        starting_money: Decimal::from(10_000),
        ..GameConfig::default()
    };
    let (mut world, mut schedule) = build_world(&config, Utc::now());
    world.resource_mut::<PendingCommands>().0.push(Command::PurchaseRoom {
        kind: RoomType::Server,
        position: (0, 0),
    });
    for id in ["cpu-1", "ram-1", "mb-1"] {
        world
            .resource_mut::<PendingCommands>()
            .0
            .push(Command::PurchaseComponent(ComponentId(id.into())));
    }
    schedule.run(&mut world);
    let parts = std::mem::take(&mut world.resource_mut::<Basket>().0);
    world.resource_mut::<PendingCommands>().0.push(Command::BuildServer(parts));
    // Headless demo: 2 simulated minutes.
    for _ in 0..120 {
        schedule.run(&mut world);
    }
    let hud = world.resource::<HudState>();
    for note in &hud.notifications {
        info!("{note}");
    }
    println!(
        "game-frontend: HUD | {} | money={} | revenue/s={} | power={}",
        hud.time, hud.money, hud.revenue_rate, hud.power
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn schedule_ticks_and_reports_rejections() {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (mut world, mut schedule) = build_world(&GameConfig::default(), t0);
        world
            .resource_mut::<PendingCommands>()
            .0
            .push(Command::PurchaseRoom {
                kind: RoomType::Software,
                position: (0, 0),
            });
        schedule.run(&mut world);
        schedule.run(&mut world);

        let hud = world.resource::<HudState>();
        assert_eq!(hud.time, "Day 0, 00:00");
        assert_eq!(hud.money, Decimal::from(2000));
        assert_eq!(hud.notifications.len(), 1);
        assert!(hud.notifications[0].starts_with("insufficient funds"));
        assert!(world.resource::<PendingCommands>().0.is_empty());
        assert_eq!(world.resource::<Sim>().clock, t0 + Duration::seconds(2));
    }

    #[test]
    fn completed_build_is_announced() {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (mut world, mut schedule) = build_world(&GameConfig::default(), t0);
        let cpu = {
            let mut sim = world.resource_mut::<Sim>();
            sim.state.purchase_component(&ComponentId("cpu-1".into())).unwrap()
        };
        world.resource_mut::<PendingCommands>().0.push(Command::BuildServer(vec![cpu]));
        for _ in 0..31 {
            schedule.run(&mut world);
        }
        let hud = world.resource::<HudState>();
        assert_eq!(hud.notifications, vec!["Server 1 is online".to_string()]);
        assert_eq!(hud.revenue_rate, Decimal::ONE);
    }
}
