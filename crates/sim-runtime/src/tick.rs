use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{software_spec, Unit, UnitId, UnitKind, UnitStatus};
use sim_econ::{build_duration, cooling_draw, cooling_load, select_shutdowns, ShutdownCandidate};
use tracing::{debug, info, warn};

use crate::state::GameState;

/// What a single tick changed, for the host to surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Seconds applied by this tick (never negative).
    pub time_delta: Decimal,
    /// Revenue earned by running units.
    pub gross_revenue: Decimal,
    /// Air-conditioning charge across rooms.
    pub cooling_cost: Decimal,
    /// Amount actually credited: gross minus cooling, floored at zero.
    pub net_revenue: Decimal,
    /// Draw of running units plus air conditioning before enforcement.
    pub power_demand: Decimal,
    /// Units that finished building.
    pub completed: Vec<UnitId>,
    /// Units switched off for exceeding power capacity.
    pub shut_down: Vec<UnitId>,
}

/// Seconds from `from` to `to` at millisecond resolution; negative if `to` is earlier.
pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    Decimal::new((to - from).num_milliseconds(), 3)
}

/// Build or development duration of a unit under the given build speed.
pub fn required_build_secs(unit: &Unit, build_speed: Decimal) -> Decimal {
    let base = match &unit.kind {
        UnitKind::Server(hw) | UnitKind::Pc { hardware: hw, .. } => hw.base_build_secs(),
        UnitKind::Software(sw) => software_spec(sw.kind).development_secs,
    };
    build_duration(base, build_speed)
}

impl GameState {
    /// Advances the simulation to `now`.
    ///
    /// Completes due builds, advances software progress, credits revenue net
    /// of cooling, and switches off the least efficient running units while
    /// demand exceeds capacity. A `now` earlier than the last update applies
    /// a zero-length tick.
    pub fn advance_in_place(&mut self, now: DateTime<Utc>) -> TickReport {
        let time_delta = seconds_between(self.last_update, now).max(Decimal::ZERO);
        self.game_time += time_delta;

        let completed = self.progress_builds(now, time_delta);

        let gross_revenue: Decimal = self
            .units
            .values()
            .filter(|u| u.is_running())
            .map(|u| u.revenue * time_delta)
            .sum();
        let cooling_cost: Decimal = self
            .rooms
            .iter()
            .map(|r| cooling_load(r.kind, r.units.len(), r.air_conditioning.efficiency))
            .sum::<Decimal>()
            * self.cooling_cost_per_watt
            * time_delta;
        let net_revenue = (gross_revenue - cooling_cost).max(Decimal::ZERO);
        self.money += net_revenue;

        let unit_draw: Decimal = self
            .units
            .values()
            .filter(|u| u.is_running())
            .map(|u| u.power_usage)
            .sum();
        let ac_draw: Decimal = self
            .rooms
            .iter()
            .map(|r| cooling_draw(r.air_conditioning.level))
            .sum();
        let power_demand = unit_draw + ac_draw;

        let shut_down = self.enforce_capacity(power_demand);
        let remaining: Decimal = self
            .units
            .values()
            .filter(|u| u.is_running())
            .map(|u| u.power_usage)
            .sum::<Decimal>()
            + ac_draw;
        self.power_usage = remaining.min(self.power_capacity).max(Decimal::ZERO);
        self.last_update = now;

        debug!(
            delta = %time_delta,
            gross = %gross_revenue,
            cooling = %cooling_cost,
            demand = %power_demand,
            money = %self.money,
            "tick"
        );

        TickReport {
            time_delta,
            gross_revenue,
            cooling_cost,
            net_revenue,
            power_demand,
            completed,
            shut_down,
        }
    }

    fn progress_builds(&mut self, now: DateTime<Utc>, time_delta: Decimal) -> Vec<UnitId> {
        let build_speed = self.multipliers.build_speed;
        let mut completed = Vec::new();
        for unit in self.units.values_mut() {
            if unit.status != UnitStatus::Building {
                continue;
            }
            let duration = required_build_secs(unit, build_speed);
            let elapsed = seconds_between(unit.build_started_at, now);
            if elapsed >= duration {
                unit.status = UnitStatus::Running;
                if let UnitKind::Software(sw) = &mut unit.kind {
                    sw.progress = Decimal::ONE_HUNDRED;
                }
                info!(unit = %unit.id, label = %unit.label(), "build completed");
                completed.push(unit.id);
            } else if let UnitKind::Software(sw) = &mut unit.kind {
                if duration > Decimal::ZERO {
                    let step = time_delta / duration * Decimal::ONE_HUNDRED;
                    sw.progress = (sw.progress + step).min(Decimal::ONE_HUNDRED);
                }
            }
        }
        completed
    }

    fn enforce_capacity(&mut self, power_demand: Decimal) -> Vec<UnitId> {
        if power_demand <= self.power_capacity {
            return Vec::new();
        }
        let candidates: Vec<ShutdownCandidate<UnitId>> = self
            .units
            .values()
            .filter(|u| u.is_running())
            .map(|u| ShutdownCandidate {
                key: u.id,
                revenue: u.revenue,
                power_usage: u.power_usage,
            })
            .collect();
        let picked = select_shutdowns(&candidates, power_demand, self.power_capacity);
        for id in &picked {
            if let Some(unit) = self.units.get_mut(id) {
                unit.status = UnitStatus::Offline;
                warn!(
                    unit = %id,
                    power = %unit.power_usage,
                    "power capacity exceeded; unit shut down"
                );
            }
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use sim_core::{ComponentId, Hardware, RoomType, SoftwareKind, SoftwareProject, UpgradeId};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    fn state(money: i64, capacity: i64) -> GameState {
        let cfg = GameConfig {
            starting_money: Decimal::from(money),
            power_capacity: Decimal::from(capacity),
            cooling_cost_per_watt: Decimal::ZERO,
        };
        GameState::new(&cfg, t0())
    }

    /// Inserts a running server with fixed economics, bypassing the build.
    fn running(s: &mut GameState, revenue: i64, power: i64) -> UnitId {
        let id = UnitId(s.next_unit_id);
        s.next_unit_id += 1;
        s.units.insert(
            id,
            Unit {
                id,
                status: UnitStatus::Running,
                build_started_at: t0(),
                revenue: Decimal::from(revenue),
                power_usage: Decimal::from(power),
                kind: UnitKind::Server(Hardware {
                    components: vec![],
                    efficiency: Decimal::ZERO,
                }),
            },
        );
        id
    }

    fn basic_server(s: &mut GameState) -> UnitId {
        let parts = ["cpu-1", "ram-1", "mb-1"]
            .iter()
            .map(|id| s.purchase_component(&ComponentId(id.to_string())).unwrap())
            .collect();
        s.start_building_server(parts, t0())
    }

    #[test]
    fn build_completes_exactly_at_duration() {
        let mut s = state(10_000, 1000);
        let id = basic_server(&mut s);
        // 30 + 20 + 35 seconds
        let r = s.advance_in_place(at(84));
        assert!(r.completed.is_empty());
        assert_eq!(s.unit(id).unwrap().status, UnitStatus::Building);
        let r = s.advance_in_place(at(85));
        assert_eq!(r.completed, vec![id]);
        assert_eq!(s.unit(id).unwrap().status, UnitStatus::Running);
    }

    #[test]
    fn build_speed_shortens_completion() {
        let mut s = state(100_000, 1000);
        s.purchase_upgrade(&UpgradeId("upgrade-build-1".into())).unwrap();
        let id = basic_server(&mut s);
        // 85 × 0.8 = 68
        s.advance_in_place(at(67));
        assert_eq!(s.unit(id).unwrap().status, UnitStatus::Building);
        s.advance_in_place(at(68));
        assert_eq!(s.unit(id).unwrap().status, UnitStatus::Running);
    }

    #[test]
    fn revenue_accrues_per_second() {
        let mut s = state(0, 1000);
        running(&mut s, 3, 100);
        let r = s.advance_in_place(at(10));
        assert_eq!(r.gross_revenue, Decimal::from(30));
        assert_eq!(s.money(), Decimal::from(30));
        assert_eq!(s.game_time(), Decimal::from(10));
        assert_eq!(s.power_usage(), Decimal::from(100));
        assert_eq!(s.last_update(), at(10));
    }

    #[test]
    fn offline_and_building_units_earn_nothing() {
        let mut s = state(10_000, 1000);
        let id = running(&mut s, 3, 100);
        s.shutdown_server(id).unwrap();
        basic_server(&mut s);
        let money = s.money();
        s.advance_in_place(at(5));
        assert_eq!(s.money(), money);
        assert_eq!(s.power_usage(), Decimal::ZERO);
    }

    #[test]
    fn least_efficient_units_shut_down_first() {
        let mut s = state(0, 150);
        let a = running(&mut s, 10, 100);
        let b = running(&mut s, 5, 100);
        let c = running(&mut s, 20, 100);
        let r = s.advance_in_place(at(1));
        assert_eq!(r.shut_down, vec![b, a]);
        assert_eq!(r.power_demand, Decimal::from(300));
        assert_eq!(s.unit(a).unwrap().status, UnitStatus::Offline);
        assert_eq!(s.unit(b).unwrap().status, UnitStatus::Offline);
        assert_eq!(s.unit(c).unwrap().status, UnitStatus::Running);
        assert_eq!(s.power_usage(), Decimal::from(100));
    }

    #[test]
    fn shutdown_is_visible_through_room_and_flat_view() {
        let mut s = state(100_000, 100);
        let room = s.purchase_room(RoomType::Server, (0, 0)).unwrap();
        let id = basic_server(&mut s);
        assert_eq!(s.room_of(id).map(|r| r.id), Some(room));
        // 105 W server + 25 W air conditioning against 100 W
        let r = s.advance_in_place(at(85));
        assert_eq!(r.shut_down, vec![id]);
        assert_eq!(s.servers().next().unwrap().status, UnitStatus::Offline);
        assert_eq!(s.room_of(id).map(|r| r.id), Some(room));
        assert_eq!(s.power_usage(), Decimal::from(25));
    }

    #[test]
    fn building_units_are_never_shut_down() {
        let mut s = state(10_000, 100);
        let building = basic_server(&mut s);
        let hungry = running(&mut s, 1, 200);
        let r = s.advance_in_place(at(10));
        assert_eq!(r.shut_down, vec![hungry]);
        assert_eq!(r.power_demand, Decimal::from(200));
        assert_eq!(s.unit(building).unwrap().status, UnitStatus::Building);
        assert_eq!(s.unit(hungry).unwrap().status, UnitStatus::Offline);
        assert_eq!(s.power_usage(), Decimal::ZERO);
    }

    #[test]
    fn air_conditioning_over_capacity_is_capped() {
        let mut s = state(10_000, 20);
        s.purchase_room(RoomType::Server, (0, 0)).unwrap();
        // level 1 air conditioning draws 25 W with nothing to shut down
        let r = s.advance_in_place(at(1));
        assert_eq!(r.power_demand, Decimal::from(25));
        assert!(r.shut_down.is_empty());
        assert_eq!(s.power_usage(), Decimal::from(20));
    }

    #[test]
    fn zero_power_unit_does_not_break_ranking() {
        let mut s = state(0, 50);
        let free = running(&mut s, 1, 0);
        let hungry = running(&mut s, 1, 100);
        let r = s.advance_in_place(at(1));
        assert_eq!(r.shut_down, vec![hungry]);
        assert_eq!(s.unit(free).unwrap().status, UnitStatus::Running);
    }

    #[test]
    fn software_progress_then_release() {
        let mut s = state(10_000, 1000);
        let id = s
            .start_developing_software("Sheets", SoftwareKind::Productivity, 2, t0())
            .unwrap();
        // 120 s development
        s.advance_in_place(at(30));
        let progress = s.unit(id).unwrap().software().unwrap().progress;
        assert_eq!(progress, Decimal::from(25));
        s.advance_in_place(at(60));
        assert_eq!(
            s.unit(id).unwrap().software().unwrap().progress,
            Decimal::from(50)
        );
        let r = s.advance_in_place(at(120));
        assert_eq!(r.completed, vec![id]);
        let unit = s.unit(id).unwrap();
        assert_eq!(unit.status, UnitStatus::Running);
        assert_eq!(unit.software().unwrap().progress, Decimal::ONE_HUNDRED);
        assert_eq!(unit.revenue, Decimal::from(40));
    }

    #[test]
    fn clock_going_backwards_is_a_zero_tick() {
        let mut s = state(0, 1000);
        running(&mut s, 5, 10);
        s.advance_in_place(at(10));
        let money = s.money();
        let r = s.advance_in_place(at(4));
        assert_eq!(r.time_delta, Decimal::ZERO);
        assert_eq!(s.money(), money);
        assert_eq!(s.game_time(), Decimal::from(10));
    }

    #[test]
    fn cooling_cost_is_deducted_but_never_below_zero() {
        let cfg = GameConfig {
            starting_money: Decimal::from(10_000),
            power_capacity: Decimal::from(1000),
            cooling_cost_per_watt: Decimal::new(1, 2),
        };
        let mut s = GameState::new(&cfg, t0());
        s.purchase_room(RoomType::Software, (0, 2)).unwrap();
        let before = s.money();
        // load (50 + 0) × 0.9 = 45 W → 0.45 per second, no revenue
        let r = s.advance_in_place(at(10));
        assert_eq!(r.cooling_cost, Decimal::new(45, 1));
        assert_eq!(r.net_revenue, Decimal::ZERO);
        assert_eq!(s.money(), before);

        let id = running(&mut s, 1, 10);
        s.rooms[0].units.push(id);
        // load (50 + 10) × 0.9 = 54 W → 0.54/s against 1/s revenue
        let r = s.advance_in_place(at(20));
        assert_eq!(r.net_revenue, Decimal::new(46, 1));
        assert_eq!(s.money(), before + Decimal::new(46, 1));
    }

    #[test]
    fn unit_cooling_scale_charges_full_load() {
        let cfg = GameConfig {
            starting_money: Decimal::from(10_000),
            power_capacity: Decimal::from(1000),
            cooling_cost_per_watt: Decimal::ONE,
        };
        let mut s = GameState::new(&cfg, t0());
        s.purchase_room(RoomType::Software, (0, 0)).unwrap();
        let id = running(&mut s, 100, 10);
        s.rooms[0].units.push(id);
        // (50 + 10) × 0.9 = 54 per second
        let r = s.advance_in_place(at(2));
        assert_eq!(r.cooling_cost, Decimal::from(108));
        assert_eq!(r.net_revenue, Decimal::from(92));
    }

    #[test]
    fn large_gap_applies_proportionally() {
        let mut s = state(0, 1000);
        running(&mut s, 2, 10);
        s.advance_in_place(at(86_400));
        assert_eq!(s.money(), Decimal::from(172_800));
    }

    #[test]
    fn seconds_between_has_millisecond_resolution() {
        let later = t0() + Duration::milliseconds(1500);
        assert_eq!(seconds_between(t0(), later), Decimal::new(15, 1));
        assert_eq!(seconds_between(later, t0()), Decimal::new(-15, 1));
    }

    #[test]
    fn required_secs_for_software_uses_table() {
        let unit = Unit {
            id: UnitId(1),
            status: UnitStatus::Building,
            build_started_at: t0(),
            revenue: Decimal::ZERO,
            power_usage: Decimal::ZERO,
            kind: UnitKind::Software(SoftwareProject {
                name: "Guard".into(),
                kind: SoftwareKind::Security,
                developers: 1,
                progress: Decimal::ZERO,
            }),
        };
        assert_eq!(required_build_secs(&unit, Decimal::ONE), Decimal::from(180));
    }

    proptest! {
        #[test]
        fn accrual_is_revenue_times_delta(rev in 0i64..1_000, millis in 0i64..10_000_000) {
            let mut s = state(0, 1_000_000);
            running(&mut s, rev, 1);
            s.advance_in_place(t0() + Duration::milliseconds(millis));
            prop_assert_eq!(s.money(), Decimal::from(rev) * Decimal::new(millis, 3));
        }

        #[test]
        fn observed_power_never_exceeds_capacity(
            units in proptest::collection::vec((0i64..50, 0i64..400), 0..12),
            capacity in 0i64..2_000,
        ) {
            let mut s = state(0, capacity);
            for (r, p) in &units {
                running(&mut s, *r, *p);
            }
            s.advance_in_place(at(1));
            prop_assert!(s.power_usage() <= Decimal::from(capacity));
            let draw: Decimal = s.units().filter(|u| u.is_running()).map(|u| u.power_usage).sum();
            prop_assert!(draw <= Decimal::from(capacity));
        }
    }
}
