use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    component_catalog, room_spec, upgrade_catalog, Component, ComponentId, Hardware, Multipliers,
    Room, RoomId, RoomType, SoftwareKind, SoftwareProject, Unit, UnitClass, UnitId, UnitKind,
    UnitStatus, Upgrade, UpgradeEffect, UpgradeId,
};
use sim_econ::{
    hardware_profile, next_air_conditioning, next_lighting, software_profile, HardwareTarget,
};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::CommandError;

/// Applied-upgrade counts at which catalog tiers 2 and 3 unlock.
pub const TIER_UNLOCKS: [(usize, u8); 2] = [(2, 2), (6, 3)];

/// The single simulation state: balances, multipliers, rooms and units.
///
/// Units live in one arena keyed by id; rooms reference them by id. The
/// per-class lists (`servers`, `pcs`, `software`) are views over the arena,
/// so room contents and the flat lists cannot drift apart. A unit built
/// while no matching room with free space is active belongs to no room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) money: Decimal,
    pub(crate) power_capacity: Decimal,
    pub(crate) power_usage: Decimal,
    pub(crate) multipliers: Multipliers,
    pub(crate) game_time: Decimal,
    pub(crate) last_update: DateTime<Utc>,
    pub(crate) active_room: Option<RoomId>,
    pub(crate) rooms: Vec<Room>,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) upgrades: Vec<Upgrade>,
    pub(crate) catalog: Vec<Component>,
    pub(crate) available_components: Vec<Component>,
    pub(crate) unlocked_tier: u8,
    pub(crate) next_unit_id: u64,
    pub(crate) next_room_id: u64,
    pub(crate) cooling_cost_per_watt: Decimal,
}

impl GameState {
    /// Fresh game with the shipped catalogs and tier-1 parts available.
    pub fn new(config: &GameConfig, now: DateTime<Utc>) -> Self {
        let catalog = component_catalog();
        let available_components = catalog.iter().filter(|c| c.tier == 1).cloned().collect();
        Self {
            money: config.starting_money,
            power_capacity: config.power_capacity,
            power_usage: Decimal::ZERO,
            multipliers: Multipliers::default(),
            game_time: Decimal::ZERO,
            last_update: now,
            active_room: None,
            rooms: Vec::new(),
            units: BTreeMap::new(),
            upgrades: upgrade_catalog(),
            catalog,
            available_components,
            unlocked_tier: 1,
            next_unit_id: 1,
            next_room_id: 1,
            cooling_cost_per_watt: config.cooling_cost_per_watt,
        }
    }

    // ---- queries ----

    pub fn money(&self) -> Decimal {
        self.money
    }

    /// Observed draw after the last tick, capped at capacity.
    pub fn power_usage(&self) -> Decimal {
        self.power_usage
    }

    pub fn power_capacity(&self) -> Decimal {
        self.power_capacity
    }

    pub fn multipliers(&self) -> &Multipliers {
        &self.multipliers
    }

    /// Simulated seconds accumulated across ticks.
    pub fn game_time(&self) -> Decimal {
        self.game_time
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn active_room_id(&self) -> Option<RoomId> {
        self.active_room
    }

    pub fn active_room(&self) -> Option<&Room> {
        self.active_room.and_then(|id| self.room(id))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// The room holding `unit`, if any.
    pub fn room_of(&self, unit: UnitId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(unit))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Every unit in creation order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_of(&self, class: UnitClass) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.class() == class)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Unit> {
        self.units_of(UnitClass::Server)
    }

    pub fn pcs(&self) -> impl Iterator<Item = &Unit> {
        self.units_of(UnitClass::Pc)
    }

    pub fn software(&self) -> impl Iterator<Item = &Unit> {
        self.units_of(UnitClass::Software)
    }

    /// Units not placed in any room.
    pub fn orphans(&self) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |u| self.room_of(u.id).is_none())
    }

    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    pub fn applied_upgrade_count(&self) -> usize {
        self.upgrades.iter().filter(|u| u.applied).count()
    }

    /// Components the player may currently buy.
    pub fn available_components(&self) -> &[Component] {
        &self.available_components
    }

    /// The full catalog, locked tiers included.
    pub fn catalog(&self) -> &[Component] {
        &self.catalog
    }

    pub fn unlocked_tier(&self) -> u8 {
        self.unlocked_tier
    }

    /// Revenue per second of all running units.
    pub fn revenue_rate(&self) -> Decimal {
        self.units
            .values()
            .filter(|u| u.is_running())
            .map(|u| u.revenue)
            .sum()
    }

    // ---- commands ----

    /// Credits `amount`. Negative amounts are ignored.
    pub fn add_money(&mut self, amount: Decimal) {
        if amount > Decimal::ZERO {
            self.money += amount;
        }
    }

    fn spend(&mut self, cost: Decimal) -> Result<(), CommandError> {
        if self.money < cost {
            debug!(%cost, money = %self.money, "insufficient funds");
            return Err(CommandError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }

    /// Buys one unlocked component and returns it for a pending build.
    ///
    /// The charge is final: a component later dropped from the build queue
    /// is not refunded, and building does not charge again.
    pub fn purchase_component(&mut self, id: &ComponentId) -> Result<Component, CommandError> {
        let component = self
            .available_components
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| CommandError::ComponentUnavailable(id.clone()))?;
        self.spend(component.cost)?;
        info!(component = %component.id, cost = %component.cost, "component purchased");
        Ok(component)
    }

    /// Starts assembling a server from already-paid components.
    pub fn start_building_server(
        &mut self,
        components: Vec<Component>,
        now: DateTime<Utc>,
    ) -> UnitId {
        self.start_hardware(HardwareTarget::Server, components, now)
    }

    /// Starts assembling a PC from already-paid components.
    pub fn start_building_pc(&mut self, components: Vec<Component>, now: DateTime<Utc>) -> UnitId {
        self.start_hardware(HardwareTarget::Pc, components, now)
    }

    fn start_hardware(
        &mut self,
        target: HardwareTarget,
        components: Vec<Component>,
        now: DateTime<Utc>,
    ) -> UnitId {
        let profile = hardware_profile(target, &components, &self.multipliers);
        let hardware = Hardware {
            components,
            efficiency: profile.efficiency,
        };
        let kind = match target {
            HardwareTarget::Server => UnitKind::Server(hardware),
            HardwareTarget::Pc => UnitKind::Pc {
                hardware,
                user_satisfaction: profile.user_satisfaction.unwrap_or(Decimal::ZERO),
            },
        };
        let id = self.place_unit(kind, profile.revenue, profile.power_usage, now);
        info!(
            unit = %id,
            ?target,
            revenue = %profile.revenue,
            power = %profile.power_usage,
            "build started"
        );
        id
    }

    /// Pays for and starts a software project.
    pub fn start_developing_software(
        &mut self,
        name: &str,
        kind: SoftwareKind,
        developers: u32,
        now: DateTime<Utc>,
    ) -> Result<UnitId, CommandError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::EmptyName);
        }
        let profile = software_profile(kind, developers, &self.multipliers)?;
        self.spend(profile.cost)?;
        let project = SoftwareProject {
            name: name.to_string(),
            kind,
            developers,
            progress: Decimal::ZERO,
        };
        let id = self.place_unit(
            UnitKind::Software(project),
            profile.revenue,
            profile.power_usage,
            now,
        );
        info!(unit = %id, ?kind, developers, cost = %profile.cost, "development started");
        Ok(id)
    }

    /// Inserts a new building unit into the arena and, when the active room
    /// accepts it, into that room.
    fn place_unit(
        &mut self,
        kind: UnitKind,
        revenue: Decimal,
        power_usage: Decimal,
        now: DateTime<Utc>,
    ) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let unit = Unit {
            id,
            status: UnitStatus::Building,
            build_started_at: now,
            revenue,
            power_usage,
            kind,
        };
        let class = unit.class();
        self.units.insert(id, unit);

        let active = self.active_room;
        match self
            .rooms
            .iter_mut()
            .find(|r| Some(r.id) == active && r.accepts(class))
        {
            Some(room) => room.units.push(id),
            None => debug!(unit = %id, ?class, "no matching room with space; unit left unassigned"),
        }
        id
    }

    /// Buys a one-shot upgrade, applies its effect, and unlocks catalog tiers.
    pub fn purchase_upgrade(&mut self, id: &UpgradeId) -> Result<(), CommandError> {
        let idx = self
            .upgrades
            .iter()
            .position(|u| &u.id == id)
            .ok_or_else(|| CommandError::UpgradeNotFound(id.clone()))?;
        if self.upgrades[idx].applied {
            debug!(upgrade = %id, "already applied");
            return Err(CommandError::UpgradeAlreadyApplied(id.clone()));
        }
        self.spend(self.upgrades[idx].cost)?;
        self.upgrades[idx].applied = true;
        match self.upgrades[idx].effect {
            UpgradeEffect::PowerCapacity(v) => self.power_capacity += v,
            UpgradeEffect::PowerEfficiency(v) => self.multipliers.power_efficiency += v,
            UpgradeEffect::BuildSpeed(v) => self.multipliers.build_speed += v,
            UpgradeEffect::Revenue(v) => self.multipliers.revenue += v,
        }
        info!(upgrade = %id, "upgrade applied");
        self.unlock_tiers();
        Ok(())
    }

    fn unlock_tiers(&mut self) {
        let applied = self.applied_upgrade_count();
        for (threshold, tier) in TIER_UNLOCKS {
            if applied >= threshold && self.unlocked_tier < tier {
                let unlocked = self.catalog.iter().filter(|c| c.tier == tier).cloned();
                self.available_components.extend(unlocked);
                self.unlocked_tier = tier;
                info!(tier, applied, "component tier unlocked");
            }
        }
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, CommandError> {
        self.units.get_mut(&id).ok_or_else(|| {
            debug!(unit = %id, "no such unit");
            CommandError::UnitNotFound(id)
        })
    }

    /// Switches a running unit off. Already-offline units are left as is.
    pub fn shutdown_server(&mut self, id: UnitId) -> Result<(), CommandError> {
        let unit = self.unit_mut(id)?;
        match unit.status {
            UnitStatus::Building => Err(CommandError::StillBuilding(id)),
            UnitStatus::Offline => Ok(()),
            UnitStatus::Running => {
                unit.status = UnitStatus::Offline;
                info!(unit = %id, "unit shut down");
                Ok(())
            }
        }
    }

    /// Switches an offline unit back on. Already-running units are left as is.
    pub fn restart_server(&mut self, id: UnitId) -> Result<(), CommandError> {
        let unit = self.unit_mut(id)?;
        match unit.status {
            UnitStatus::Building => Err(CommandError::StillBuilding(id)),
            UnitStatus::Running => Ok(()),
            UnitStatus::Offline => {
                unit.status = UnitStatus::Running;
                info!(unit = %id, "unit restarted");
                Ok(())
            }
        }
    }

    /// Buys an empty room and makes it the active one.
    pub fn purchase_room(
        &mut self,
        kind: RoomType,
        position: (i32, i32),
    ) -> Result<RoomId, CommandError> {
        self.spend(room_spec(kind).cost)?;
        let id = RoomId(self.next_room_id);
        self.next_room_id += 1;
        let ordinal = self.rooms.iter().filter(|r| r.kind == kind).count() + 1;
        let name = format!("{} Room {}", kind.display_name(), ordinal);
        info!(room = %id, %name, "room purchased");
        self.rooms.push(Room::new(id, name, kind, position));
        self.active_room = Some(id);
        Ok(id)
    }

    pub fn set_active_room(&mut self, id: RoomId) -> Result<(), CommandError> {
        if self.room(id).is_none() {
            debug!(room = %id, "no such room");
            return Err(CommandError::RoomNotFound(id));
        }
        self.active_room = Some(id);
        Ok(())
    }

    fn room_index(&self, id: RoomId) -> Result<usize, CommandError> {
        self.rooms.iter().position(|r| r.id == id).ok_or_else(|| {
            debug!(room = %id, "no such room");
            CommandError::RoomNotFound(id)
        })
    }

    pub fn upgrade_room_air_conditioning(&mut self, id: RoomId) -> Result<(), CommandError> {
        let idx = self.room_index(id)?;
        let next = next_air_conditioning(&self.rooms[idx].air_conditioning);
        self.spend(self.rooms[idx].air_conditioning.cost)?;
        info!(
            room = %id,
            level = next.level,
            efficiency = %next.efficiency,
            "air conditioning upgraded"
        );
        self.rooms[idx].air_conditioning = next;
        Ok(())
    }

    pub fn upgrade_room_lighting(&mut self, id: RoomId, color: &str) -> Result<(), CommandError> {
        let idx = self.room_index(id)?;
        let next = next_lighting(&self.rooms[idx].lighting, color);
        self.spend(self.rooms[idx].lighting.cost)?;
        info!(room = %id, %color, intensity = %next.intensity, "lighting upgraded");
        self.rooms[idx].lighting = next;
        Ok(())
    }
}
