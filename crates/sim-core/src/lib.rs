#![deny(warnings)]

//! Core domain models and invariants for Datacenter Tycoon.
//!
//! This crate defines the serializable types shared by the economy helpers and
//! the simulation runtime, the static reference catalogs, and validation
//! helpers that guarantee basic catalog invariants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub mod catalog;

pub use catalog::{
    component_catalog, room_spec, software_spec, upgrade_catalog, RoomSpec, SoftwareSpec,
};

/// Catalog identifier of a hardware component, e.g. "cpu-1".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub String);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog identifier of a global upgrade, e.g. "upgrade-power-1".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub String);

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a built unit. Allocated monotonically by the runtime.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Identifier of a purchased room.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// Kinds of hardware components.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentKind {
    /// Central Processing Unit
    CPU,
    /// Graphics Processing Unit
    GPU,
    /// Memory module
    RAM,
    /// Mainboard
    Motherboard,
    /// Disk or flash storage
    Storage,
    /// Power Supply Unit
    PSU,
}

/// An immutable hardware catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Catalog identifier.
    pub id: ComponentId,
    /// Component kind.
    pub kind: ComponentKind,
    /// Display name.
    pub name: String,
    /// Purchase cost (>= 0).
    pub cost: Decimal,
    /// Performance points contributed to revenue.
    pub performance: u32,
    /// Power draw in watts. Negative for PSUs, where the magnitude is an
    /// efficiency contribution rather than a draw.
    pub power_usage: i32,
    /// Assembly time in seconds.
    pub build_time_secs: u32,
    /// Unlock tier in [1, 3].
    pub tier: u8,
    /// Flavor text.
    pub description: String,
}

/// Lifecycle state of a unit.
///
/// `Building` only ever transitions to `Running`; `Running` and `Offline`
/// toggle either by command or by power-capacity enforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    /// Under construction or development.
    Building,
    /// Drawing power and earning revenue.
    Running,
    /// Built but switched off.
    Offline,
}

/// Product line of a software unit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SoftwareKind {
    /// Operating system
    OS,
    /// Office and productivity suite
    Productivity,
    /// Security tooling
    Security,
    /// Developer tooling
    Development,
}

/// Discriminant of the unit sum type, used for room routing and views.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UnitClass {
    /// Rack server
    Server,
    /// Desktop PC
    Pc,
    /// Software product
    Software,
}

/// Parts and PSU-derived efficiency shared by servers and PCs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    /// Components consumed by the build, in selection order.
    pub components: Vec<Component>,
    /// PSU efficiency factor (|psu power| / 100, 0 without a PSU).
    pub efficiency: Decimal,
}

impl Hardware {
    /// Sum of component assembly times in seconds.
    pub fn base_build_secs(&self) -> u32 {
        self.components.iter().map(|c| c.build_time_secs).sum()
    }

    /// Sum of component performance points.
    pub fn total_performance(&self) -> u32 {
        self.components.iter().map(|c| c.performance).sum()
    }
}

/// A software product under development or released.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoftwareProject {
    /// Product name chosen by the player.
    pub name: String,
    /// Product line.
    pub kind: SoftwareKind,
    /// Developers assigned (>= 1).
    pub developers: u32,
    /// Development progress in [0, 100].
    pub progress: Decimal,
}

/// Variant-specific payload of a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnitKind {
    /// Rack server built from components.
    Server(Hardware),
    /// Desktop PC built from components.
    Pc {
        /// Parts and efficiency.
        hardware: Hardware,
        /// Satisfaction score in [0, 100].
        user_satisfaction: Decimal,
    },
    /// Software product.
    Software(SoftwareProject),
}

/// A server, PC, or software product owned by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique id.
    pub id: UnitId,
    /// Lifecycle state.
    pub status: UnitStatus,
    /// Wall-clock time the build started.
    pub build_started_at: DateTime<Utc>,
    /// Revenue per second while running.
    pub revenue: Decimal,
    /// Watts drawn while running.
    pub power_usage: Decimal,
    /// Variant payload.
    pub kind: UnitKind,
}

impl Unit {
    /// Discriminant of this unit.
    pub fn class(&self) -> UnitClass {
        match self.kind {
            UnitKind::Server(_) => UnitClass::Server,
            UnitKind::Pc { .. } => UnitClass::Pc,
            UnitKind::Software(_) => UnitClass::Software,
        }
    }

    /// Hardware payload for servers and PCs.
    pub fn hardware(&self) -> Option<&Hardware> {
        match &self.kind {
            UnitKind::Server(hw) => Some(hw),
            UnitKind::Pc { hardware, .. } => Some(hardware),
            UnitKind::Software(_) => None,
        }
    }

    /// Software payload.
    pub fn software(&self) -> Option<&SoftwareProject> {
        match &self.kind {
            UnitKind::Software(sw) => Some(sw),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == UnitStatus::Running
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match &self.kind {
            UnitKind::Server(_) => format!("Server {}", self.id.0),
            UnitKind::Pc { .. } => format!("PC {}", self.id.0),
            UnitKind::Software(sw) => sw.name.clone(),
        }
    }
}

/// Room types. Each fixes which unit class it holds and its dimensions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    /// Holds servers.
    Server,
    /// Holds PCs.
    Pc,
    /// Holds software projects.
    Software,
}

impl RoomType {
    /// The unit class this room type may hold.
    pub fn unit_class(self) -> UnitClass {
        match self {
            RoomType::Server => UnitClass::Server,
            RoomType::Pc => UnitClass::Pc,
            RoomType::Software => UnitClass::Software,
        }
    }

    /// Display name, e.g. "Server".
    pub fn display_name(self) -> &'static str {
        match self {
            RoomType::Server => "Server",
            RoomType::Pc => "PC",
            RoomType::Software => "Software",
        }
    }
}

/// Air-conditioning state of a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirConditioning {
    /// Installed level (>= 1).
    pub level: u32,
    /// Cost of the next upgrade.
    pub cost: Decimal,
    /// Cooling efficiency in [0, 0.5].
    pub efficiency: Decimal,
}

impl Default for AirConditioning {
    fn default() -> Self {
        Self {
            level: 1,
            cost: Decimal::new(1000, 0),
            efficiency: Decimal::new(1, 1),
        }
    }
}

/// Lighting state of a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    /// Hex colour, e.g. "#4287f5".
    pub color: String,
    /// Intensity in [0, 2.0].
    pub intensity: Decimal,
    /// Cost of the next upgrade.
    pub cost: Decimal,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            intensity: Decimal::ONE,
            cost: Decimal::new(500, 0),
        }
    }
}

/// A capacity-bounded container of same-class units.
///
/// Rooms hold unit ids only; the units themselves live in the runtime's
/// arena, so a room can never disagree with the unit list about a unit's data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique id.
    pub id: RoomId,
    /// Display name, e.g. "Server Room 1".
    pub name: String,
    /// Room type.
    pub kind: RoomType,
    /// Grid position on the floor plan.
    pub position: (i32, i32),
    /// Owned units, in placement order.
    pub units: Vec<UnitId>,
    /// Air-conditioning upgrade state.
    pub air_conditioning: AirConditioning,
    /// Lighting upgrade state.
    pub lighting: Lighting,
}

impl Room {
    /// Creates an empty room with default upgrade state.
    pub fn new(id: RoomId, name: String, kind: RoomType, position: (i32, i32)) -> Self {
        Self {
            id,
            name,
            kind,
            position,
            units: Vec::new(),
            air_conditioning: AirConditioning::default(),
            lighting: Lighting::default(),
        }
    }

    pub fn max_units(&self) -> usize {
        room_spec(self.kind).max_units
    }

    pub fn size(&self) -> u32 {
        room_spec(self.kind).size
    }

    /// Whether a unit of `class` can be placed here right now.
    pub fn accepts(&self, class: UnitClass) -> bool {
        self.kind.unit_class() == class && self.units.len() < self.max_units()
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }
}

/// Effect of a global upgrade, added once to the matching capacity or multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum UpgradeEffect {
    /// Adds watts to the power capacity.
    PowerCapacity(Decimal),
    /// Adds to the power efficiency multiplier.
    PowerEfficiency(Decimal),
    /// Adds to the build speed multiplier.
    BuildSpeed(Decimal),
    /// Adds to the revenue multiplier.
    Revenue(Decimal),
}

/// One-shot global upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Catalog identifier.
    pub id: UpgradeId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Purchase cost.
    pub cost: Decimal,
    /// Whether it has been purchased.
    pub applied: bool,
    /// Effect applied on purchase.
    pub effect: UpgradeEffect,
}

/// Global multipliers. All start at 1 and only grow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    /// Shortens build and development time.
    pub build_speed: Decimal,
    /// Scales revenue of newly built units.
    pub revenue: Decimal,
    /// Reduces power draw of newly built units.
    pub power_efficiency: Decimal,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            build_speed: Decimal::ONE,
            revenue: Decimal::ONE,
            power_efficiency: Decimal::ONE,
        }
    }
}

/// Validation errors for catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Tier outside [1, 3].
    #[error("tier {0} is out of supported range [1, 3]")]
    TierOutOfRange(u8),
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// PSUs must carry a non-positive power value; other parts non-negative.
    #[error("power value of {0} has the wrong sign")]
    PowerSign(ComponentId),
    /// Names must not be blank.
    #[error("blank name")]
    BlankName,
    /// Upgrade effect values must be positive.
    #[error("upgrade effect of {0} must be positive")]
    NonPositiveEffect(UpgradeId),
    /// Duplicate identifier in a catalog.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

/// Validate a component catalog entry.
pub fn validate_component(c: &Component) -> Result<(), ValidationError> {
    if !(1..=3).contains(&c.tier) {
        return Err(ValidationError::TierOutOfRange(c.tier));
    }
    if c.cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if c.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    let sign_ok = match c.kind {
        ComponentKind::PSU => c.power_usage <= 0,
        _ => c.power_usage >= 0,
    };
    if !sign_ok {
        return Err(ValidationError::PowerSign(c.id.clone()));
    }
    Ok(())
}

/// Validate an upgrade catalog entry.
pub fn validate_upgrade(u: &Upgrade) -> Result<(), ValidationError> {
    if u.cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if u.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    let value = match u.effect {
        UpgradeEffect::PowerCapacity(v)
        | UpgradeEffect::PowerEfficiency(v)
        | UpgradeEffect::BuildSpeed(v)
        | UpgradeEffect::Revenue(v) => v,
    };
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveEffect(u.id.clone()));
    }
    Ok(())
}

/// Validate both catalogs, including id uniqueness.
pub fn validate_catalogs(
    components: &[Component],
    upgrades: &[Upgrade],
) -> Result<(), ValidationError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for c in components {
        validate_component(c)?;
        if !seen.insert(&c.id.0) {
            return Err(ValidationError::DuplicateId(c.id.0.clone()));
        }
    }
    for u in upgrades {
        validate_upgrade(u)?;
        if !seen.insert(&u.id.0) {
            return Err(ValidationError::DuplicateId(u.id.0.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn part(id: &str, kind: ComponentKind, power: i32, tier: u8) -> Component {
        Component {
            id: ComponentId(id.to_string()),
            kind,
            name: format!("Part {id}"),
            cost: Decimal::new(100, 0),
            performance: 5,
            power_usage: power,
            build_time_secs: 10,
            tier,
            description: String::new(),
        }
    }

    #[test]
    fn shipped_catalogs_are_valid() {
        validate_catalogs(&component_catalog(), &upgrade_catalog()).unwrap();
    }

    #[test]
    fn psu_must_not_draw_power() {
        let psu = part("psu-x", ComponentKind::PSU, 10, 1);
        assert_eq!(
            validate_component(&psu),
            Err(ValidationError::PowerSign(ComponentId("psu-x".into())))
        );
        let cpu = part("cpu-x", ComponentKind::CPU, -5, 1);
        assert!(validate_component(&cpu).is_err());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let parts = vec![
            part("a", ComponentKind::RAM, 5, 1),
            part("a", ComponentKind::GPU, 5, 1),
        ];
        assert_eq!(
            validate_catalogs(&parts, &[]),
            Err(ValidationError::DuplicateId("a".into()))
        );
    }

    #[test]
    fn unit_kind_serde_roundtrip() {
        let unit = Unit {
            id: UnitId(7),
            status: UnitStatus::Building,
            build_started_at: Utc.timestamp_opt(0, 0).unwrap(),
            revenue: Decimal::new(2, 0),
            power_usage: Decimal::new(105, 0),
            kind: UnitKind::Pc {
                hardware: Hardware {
                    components: vec![part("cpu-x", ComponentKind::CPU, 65, 1)],
                    efficiency: Decimal::ZERO,
                },
                user_satisfaction: Decimal::new(10, 0),
            },
        };
        let s = serde_json::to_string(&unit).unwrap();
        assert!(s.contains("\"kind\":\"pc\""));
        let back: Unit = serde_json::from_str(&s).unwrap();
        assert_eq!(back, unit);
        assert_eq!(back.class(), UnitClass::Pc);
        assert_eq!(back.label(), "PC 7");
    }

    #[test]
    fn room_accepts_matching_class_until_full() {
        let mut room = Room::new(RoomId(1), "PC Room 1".into(), RoomType::Pc, (0, 1));
        assert!(room.accepts(UnitClass::Pc));
        assert!(!room.accepts(UnitClass::Server));
        for i in 0..room.max_units() {
            room.units.push(UnitId(i as u64));
        }
        assert!(!room.accepts(UnitClass::Pc));
        assert_eq!(room.air_conditioning.level, 1);
        assert_eq!(room.lighting.color, "#ffffff");
    }

    #[test]
    fn kind_tags_use_catalog_names() {
        let tags = |v: serde_json::Value| -> Vec<String> {
            v.as_array()
                .unwrap()
                .iter()
                .map(|t| t.as_str().unwrap().to_string())
                .collect()
        };
        let parts = serde_json::to_value([
            ComponentKind::CPU,
            ComponentKind::GPU,
            ComponentKind::RAM,
            ComponentKind::Motherboard,
            ComponentKind::Storage,
            ComponentKind::PSU,
        ])
        .unwrap();
        assert_eq!(tags(parts), ["CPU", "GPU", "RAM", "MOTHERBOARD", "STORAGE", "PSU"]);
        let software = serde_json::to_value([
            SoftwareKind::OS,
            SoftwareKind::Productivity,
            SoftwareKind::Security,
            SoftwareKind::Development,
        ])
        .unwrap();
        assert_eq!(tags(software), ["OS", "PRODUCTIVITY", "SECURITY", "DEVELOPMENT"]);
        let rooms =
            serde_json::to_value([RoomType::Server, RoomType::Pc, RoomType::Software]).unwrap();
        assert_eq!(tags(rooms), ["SERVER", "PC", "SOFTWARE"]);

        let os: SoftwareKind = serde_json::from_str("\"OS\"").unwrap();
        assert_eq!(os, SoftwareKind::OS);
        let psu: ComponentKind = serde_json::from_str("\"PSU\"").unwrap();
        assert_eq!(psu, ComponentKind::PSU);
    }

    proptest! {
        #[test]
        fn tiers_outside_range_rejected(tier in 4u8..=255) {
            let p = part("gpu-x", ComponentKind::GPU, 100, tier);
            prop_assert_eq!(validate_component(&p), Err(ValidationError::TierOutOfRange(tier)));
        }

        #[test]
        fn hardware_totals_sum_components(times in proptest::collection::vec(0u32..200, 0..8)) {
            let components: Vec<Component> = times
                .iter()
                .map(|t| Component {
                    build_time_secs: *t,
                    ..part("ram-x", ComponentKind::RAM, 5, 1)
                })
                .collect();
            let hw = Hardware { components, efficiency: Decimal::ZERO };
            prop_assert_eq!(hw.base_build_secs(), times.iter().sum::<u32>());
            prop_assert_eq!(hw.total_performance(), 5 * times.len() as u32);
        }
    }
}
