//! Static reference data: hardware parts, upgrades, room and software tables.

use crate::{
    Component, ComponentId, ComponentKind, RoomType, SoftwareKind, Upgrade, UpgradeEffect,
    UpgradeId,
};
use rust_decimal::Decimal;

/// Per-room-type constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomSpec {
    /// Purchase cost.
    pub cost: Decimal,
    /// Unit capacity.
    pub max_units: usize,
    /// Floor-plan size in grid cells.
    pub size: u32,
    /// Baseline watts the room's cooling load is computed from.
    pub base_power: Decimal,
}

/// Per-software-type base values, scaled by developer count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftwareSpec {
    /// Cost per developer.
    pub cost: Decimal,
    /// Revenue per second per developer.
    pub revenue: Decimal,
    /// Development time in seconds.
    pub development_secs: u32,
}

pub fn room_spec(kind: RoomType) -> RoomSpec {
    let (cost, max_units, size, base_power) = match kind {
        RoomType::Server => (5000, 10, 4, 200),
        RoomType::Pc => (3000, 8, 3, 100),
        RoomType::Software => (7000, 5, 3, 50),
    };
    RoomSpec {
        cost: Decimal::from(cost),
        max_units,
        size,
        base_power: Decimal::from(base_power),
    }
}

pub fn software_spec(kind: SoftwareKind) -> SoftwareSpec {
    let (cost, revenue, development_secs) = match kind {
        SoftwareKind::OS => (5000, 50, 300),
        SoftwareKind::Productivity => (2000, 20, 120),
        SoftwareKind::Security => (3000, 30, 180),
        SoftwareKind::Development => (4000, 40, 240),
    };
    SoftwareSpec {
        cost: Decimal::from(cost),
        revenue: Decimal::from(revenue),
        development_secs,
    }
}

#[allow(clippy::too_many_arguments)]
fn part(
    id: &str,
    kind: ComponentKind,
    name: &str,
    cost: i64,
    performance: u32,
    power_usage: i32,
    build_time_secs: u32,
    tier: u8,
    description: &str,
) -> Component {
    Component {
        id: ComponentId(id.to_string()),
        kind,
        name: name.to_string(),
        cost: Decimal::from(cost),
        performance,
        power_usage,
        build_time_secs,
        tier,
        description: description.to_string(),
    }
}

/// The full hardware catalog across all tiers.
#[rustfmt::skip]
pub fn component_catalog() -> Vec<Component> {
    use ComponentKind::*;
    vec![
        part("cpu-1", CPU, "Basic CPU", 200, 10, 65, 30, 1,
             "Entry-level CPU with basic performance"),
        part("cpu-2", CPU, "Mid-range CPU", 500, 25, 95, 45, 2,
             "Balanced CPU for general workloads"),
        part("cpu-3", CPU, "High-end CPU", 1200, 60, 125, 60, 3,
             "Powerful CPU for demanding applications"),
        part("gpu-1", GPU, "Basic GPU", 300, 15, 120, 40, 1,
             "Entry-level GPU for basic compute tasks"),
        part("gpu-2", GPU, "Mid-range GPU", 800, 40, 180, 55, 2,
             "Balanced GPU for various workloads"),
        part("gpu-3", GPU, "High-end GPU", 1800, 90, 250, 70, 3,
             "Powerful GPU for AI and rendering tasks"),
        part("ram-1", RAM, "8GB RAM", 100, 5, 10, 20, 1, "Basic memory module"),
        part("ram-2", RAM, "16GB RAM", 200, 12, 15, 25, 2, "Standard memory module"),
        part("ram-3", RAM, "32GB RAM", 400, 25, 20, 30, 3, "High-capacity memory module"),
        part("storage-1", Storage, "500GB HDD", 50, 3, 8, 15, 1, "Basic storage solution"),
        part("storage-2", Storage, "1TB SSD", 150, 10, 5, 20, 2,
             "Faster storage with better reliability"),
        part("storage-3", Storage, "2TB NVMe", 300, 20, 7, 25, 3,
             "High-speed storage for demanding applications"),
        part("mb-1", Motherboard, "Basic Motherboard", 120, 5, 30, 35, 1,
             "Entry-level motherboard with basic features"),
        part("mb-2", Motherboard, "Standard Motherboard", 250, 12, 40, 45, 2,
             "Mid-range motherboard with good connectivity"),
        part("mb-3", Motherboard, "Premium Motherboard", 500, 25, 50, 55, 3,
             "High-end motherboard with advanced features"),
        part("psu-1", PSU, "500W PSU", 80, 3, -10, 25, 1, "Basic power supply unit"),
        part("psu-2", PSU, "750W PSU", 150, 8, -20, 30, 2,
             "Mid-range power supply with better efficiency"),
        part("psu-3", PSU, "1000W PSU", 300, 15, -30, 40, 3,
             "High-end power supply with excellent efficiency"),
    ]
}

fn upgrade(id: &str, name: &str, description: &str, cost: i64, effect: UpgradeEffect) -> Upgrade {
    Upgrade {
        id: UpgradeId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        cost: Decimal::from(cost),
        applied: false,
        effect,
    }
}

/// The global upgrade catalog, all unapplied.
#[rustfmt::skip]
pub fn upgrade_catalog() -> Vec<Upgrade> {
    use UpgradeEffect::*;
    vec![
        upgrade("upgrade-power-1", "Power Grid Expansion I",
                "Increase power capacity by 500W",
                1000, PowerCapacity(Decimal::from(500))),
        upgrade("upgrade-power-2", "Power Grid Expansion II",
                "Increase power capacity by 1000W",
                3000, PowerCapacity(Decimal::from(1000))),
        upgrade("upgrade-efficiency-1", "Cooling System I",
                "Reduce power consumption by 10%",
                2000, PowerEfficiency(Decimal::new(10, 2))),
        upgrade("upgrade-efficiency-2", "Cooling System II",
                "Reduce power consumption by an additional 15%",
                5000, PowerEfficiency(Decimal::new(15, 2))),
        upgrade("upgrade-build-1", "Assembly Line I",
                "Reduce build time by 20%",
                1500, BuildSpeed(Decimal::new(20, 2))),
        upgrade("upgrade-build-2", "Assembly Line II",
                "Reduce build time by an additional 25%",
                4000, BuildSpeed(Decimal::new(25, 2))),
        upgrade("upgrade-revenue-1", "Optimization Software I",
                "Increase server revenue by 15%",
                2500, Revenue(Decimal::new(15, 2))),
        upgrade("upgrade-revenue-2", "Optimization Software II",
                "Increase server revenue by an additional 20%",
                6000, Revenue(Decimal::new(20, 2))),
    ]
}
