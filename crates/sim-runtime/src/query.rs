//! Read-only helpers the host uses for display.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{Component, ComponentKind, Room, UnitId, UnitKind, UnitStatus};
use sim_econ::build_progress;

use crate::state::GameState;
use crate::tick::{required_build_secs, seconds_between};

const SECS_PER_DAY: u64 = 86_400;

/// Renders simulated seconds as "Day D, HH:MM", counting days from zero.
pub fn format_game_time(game_time: Decimal) -> String {
    let secs = game_time.trunc().to_u64().unwrap_or(0);
    let days = secs / SECS_PER_DAY;
    let hours = (secs % SECS_PER_DAY) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("Day {days}, {hours:02}:{minutes:02}")
}

/// Groups components by kind, keeping catalog order inside each group.
pub fn components_by_kind(components: &[Component]) -> BTreeMap<ComponentKind, Vec<&Component>> {
    let mut groups: BTreeMap<ComponentKind, Vec<&Component>> = BTreeMap::new();
    for c in components {
        groups.entry(c.kind).or_default().push(c);
    }
    groups
}

/// Free slots left in a room.
pub fn room_vacancy(room: &Room) -> usize {
    room.max_units().saturating_sub(room.units.len())
}

impl GameState {
    /// Completion percentage of a unit at `now`.
    ///
    /// Hardware is measured against its build-speed-scaled duration. Software
    /// reports its accumulated development progress. Finished units report 100.
    pub fn build_progress(&self, id: UnitId, now: DateTime<Utc>) -> Option<Decimal> {
        let unit = self.unit(id)?;
        if unit.status != UnitStatus::Building {
            return Some(Decimal::ONE_HUNDRED);
        }
        Some(match &unit.kind {
            UnitKind::Software(sw) => sw.progress,
            UnitKind::Server(_) | UnitKind::Pc { .. } => build_progress(
                seconds_between(unit.build_started_at, now),
                required_build_secs(unit, self.multipliers.build_speed),
            ),
        })
    }

    pub fn available_by_kind(&self) -> BTreeMap<ComponentKind, Vec<&Component>> {
        components_by_kind(&self.available_components)
    }

    pub fn formatted_game_time(&self) -> String {
        format_game_time(self.game_time)
    }

    /// Whole-state JSON snapshot for hosts.
    pub fn snapshot(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
