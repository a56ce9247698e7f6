#![deny(warnings)]

//! Economic models: unit pricing, power and build-time helpers for Datacenter Tycoon.
//!
//! This module provides validated utilities for:
//! - Revenue, power draw and satisfaction of freshly built hardware
//! - Software project cost and yield by developer count
//! - Build durations under the global build speed multiplier
//! - Room cooling load and the revenue-per-watt shutdown order

use rust_decimal::Decimal;
use sim_core::{
    room_spec, software_spec, AirConditioning, Component, ComponentKind, Lighting, Multipliers,
    RoomType, SoftwareKind,
};
use thiserror::Error;

/// Watts drawn per developer on a software project.
pub const SOFTWARE_WATTS_PER_DEVELOPER: u32 = 50;
/// Watts drawn by a room's air conditioning per installed level.
pub const AC_WATTS_PER_LEVEL: u32 = 25;
/// Extra cooling load per unit placed in a room, in watts.
pub const COOLING_WATTS_PER_UNIT: u32 = 10;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Software needs at least one developer.
    #[error("developer count must be at least 1")]
    NoDevelopers,
}

/// What a component selection is being assembled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareTarget {
    /// Rack server, 0.1 revenue per performance point.
    Server,
    /// Desktop PC, 0.05 revenue per performance point.
    Pc,
}

impl HardwareTarget {
    /// Revenue per second per performance point.
    pub fn base_rate(self) -> Decimal {
        match self {
            HardwareTarget::Server => Decimal::new(1, 1),
            HardwareTarget::Pc => Decimal::new(5, 2),
        }
    }

    /// Component kinds a build of this target cannot do without.
    pub fn required_kinds(self) -> &'static [ComponentKind] {
        match self {
            HardwareTarget::Server => &[
                ComponentKind::CPU,
                ComponentKind::RAM,
                ComponentKind::Motherboard,
            ],
            HardwareTarget::Pc => &[
                ComponentKind::CPU,
                ComponentKind::RAM,
                ComponentKind::Motherboard,
                ComponentKind::Storage,
            ],
        }
    }
}

/// Derived economics of a server or PC at build time.
#[derive(Clone, Debug, PartialEq)]
pub struct HardwareProfile {
    /// Revenue per second while running.
    pub revenue: Decimal,
    /// Watts drawn while running.
    pub power_usage: Decimal,
    /// PSU efficiency factor.
    pub efficiency: Decimal,
    /// Satisfaction score, PCs only.
    pub user_satisfaction: Option<Decimal>,
}

/// Derived economics of a software project.
#[derive(Clone, Debug, PartialEq)]
pub struct SoftwareProfile {
    /// Upfront development cost.
    pub cost: Decimal,
    /// Revenue per second once released.
    pub revenue: Decimal,
    /// Watts drawn once released.
    pub power_usage: Decimal,
    /// Unscaled development time in seconds.
    pub development_secs: u32,
}

/// Efficiency factor of the first PSU in a selection: |power| / 100, or 0.
pub fn psu_efficiency(components: &[Component]) -> Decimal {
    components
        .iter()
        .find(|c| c.kind == ComponentKind::PSU)
        .map(|psu| Decimal::from(psu.power_usage).abs() / Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Kinds from `target.required_kinds()` absent from the selection.
pub fn missing_components(target: HardwareTarget, components: &[Component]) -> Vec<ComponentKind> {
    target
        .required_kinds()
        .iter()
        .copied()
        .filter(|kind| !components.iter().any(|c| c.kind == *kind))
        .collect()
}

/// Revenue a selection would earn before multipliers, as shown while queueing.
pub fn estimated_revenue(target: HardwareTarget, components: &[Component]) -> Decimal {
    let perf: u32 = components.iter().map(|c| c.performance).sum();
    Decimal::from(perf) * target.base_rate()
}

/// PC satisfaction: half the total performance, capped at 100.
pub fn user_satisfaction(total_performance: u32) -> Decimal {
    (Decimal::from(total_performance) / Decimal::TWO).min(Decimal::ONE_HUNDRED)
}

/// Economics of a hardware build under the current multipliers.
///
/// `power = raw × (1 − (psu_efficiency + power_multiplier − 1))` where `raw`
/// includes the PSU's own negative value, and
/// `revenue = Σperformance × base_rate × revenue_multiplier`.
pub fn hardware_profile(
    target: HardwareTarget,
    components: &[Component],
    multipliers: &Multipliers,
) -> HardwareProfile {
    let efficiency = psu_efficiency(components);
    let raw_power: i64 = components.iter().map(|c| i64::from(c.power_usage)).sum();
    let power_factor =
        Decimal::ONE - (efficiency + multipliers.power_efficiency - Decimal::ONE);
    let power_usage = Decimal::from(raw_power) * power_factor;
    let revenue = estimated_revenue(target, components) * multipliers.revenue;
    let user_satisfaction = match target {
        HardwareTarget::Server => None,
        HardwareTarget::Pc => Some(user_satisfaction(
            components.iter().map(|c| c.performance).sum(),
        )),
    };
    HardwareProfile {
        revenue,
        power_usage,
        efficiency,
        user_satisfaction,
    }
}

/// Economics of a software project staffed by `developers`.
pub fn software_profile(
    kind: SoftwareKind,
    developers: u32,
    multipliers: &Multipliers,
) -> Result<SoftwareProfile, EconError> {
    if developers == 0 {
        return Err(EconError::NoDevelopers);
    }
    let spec = software_spec(kind);
    let devs = Decimal::from(developers);
    Ok(SoftwareProfile {
        cost: spec.cost * devs,
        revenue: spec.revenue * devs * multipliers.revenue,
        power_usage: Decimal::from(SOFTWARE_WATTS_PER_DEVELOPER) * devs,
        development_secs: spec.development_secs,
    })
}

/// Scaled build duration in seconds: `base × (1 − (build_speed − 1))`, never negative.
pub fn build_duration(base_secs: u32, build_speed: Decimal) -> Decimal {
    let factor = Decimal::ONE - (build_speed - Decimal::ONE);
    (Decimal::from(base_secs) * factor).max(Decimal::ZERO)
}

/// Percentage of a build elapsed, in [0, 100]. A zero-length build is complete.
pub fn build_progress(elapsed_secs: Decimal, duration_secs: Decimal) -> Decimal {
    if duration_secs <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }
    (elapsed_secs / duration_secs * Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO)
        .min(Decimal::ONE_HUNDRED)
}

/// Cooling load of a room per second: `(base_power + units × 10) × (1 − ac_efficiency)`.
pub fn cooling_load(kind: RoomType, unit_count: usize, ac_efficiency: Decimal) -> Decimal {
    let base = room_spec(kind).base_power
        + Decimal::from(unit_count as u64) * Decimal::from(COOLING_WATTS_PER_UNIT);
    base * (Decimal::ONE - ac_efficiency)
}

/// Fixed power draw of a room's air conditioning.
pub fn cooling_draw(level: u32) -> Decimal {
    Decimal::from(AC_WATTS_PER_LEVEL) * Decimal::from(level)
}

/// Air conditioning after one more upgrade: level +1, efficiency +0.1 up to
/// 0.5, next cost ×1.5.
pub fn next_air_conditioning(ac: &AirConditioning) -> AirConditioning {
    AirConditioning {
        level: ac.level.saturating_add(1),
        cost: ac.cost * Decimal::new(15, 1),
        efficiency: (ac.efficiency + Decimal::new(1, 1)).min(Decimal::new(5, 1)),
    }
}

/// Lighting after one more upgrade: colour replaced, intensity +0.1 up to
/// 2.0, next cost ×1.5.
pub fn next_lighting(lighting: &Lighting, color: &str) -> Lighting {
    Lighting {
        color: color.to_string(),
        intensity: (lighting.intensity + Decimal::new(1, 1)).min(Decimal::TWO),
        cost: lighting.cost * Decimal::new(15, 1),
    }
}

/// Revenue earned per watt. Units drawing no power rank above every finite value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Efficiency {
    /// revenue / watts
    Finite(Decimal),
    /// Zero or negative draw.
    Unbounded,
}

pub fn efficiency(revenue: Decimal, power_usage: Decimal) -> Efficiency {
    if power_usage <= Decimal::ZERO {
        Efficiency::Unbounded
    } else {
        Efficiency::Finite(revenue / power_usage)
    }
}

/// A running unit eligible for automatic shutdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShutdownCandidate<K> {
    /// Caller's key for the unit.
    pub key: K,
    /// Revenue per second.
    pub revenue: Decimal,
    /// Watts drawn.
    pub power_usage: Decimal,
}

/// Picks units to switch off, least efficient first, until `total_power`
/// fits within `capacity` or the candidates run out.
///
/// Ordering is stable, so equally efficient units go in input order. Units
/// with no positive draw are never picked since removing them frees nothing.
pub fn select_shutdowns<K: Copy>(
    candidates: &[ShutdownCandidate<K>],
    total_power: Decimal,
    capacity: Decimal,
) -> Vec<K> {
    if total_power <= capacity {
        return Vec::new();
    }
    let mut ranked: Vec<&ShutdownCandidate<K>> = candidates.iter().collect();
    ranked.sort_by_key(|c| efficiency(c.revenue, c.power_usage));

    let mut remaining = total_power;
    let mut picked = Vec::new();
    for c in ranked {
        if remaining <= capacity {
            break;
        }
        if c.power_usage <= Decimal::ZERO {
            continue;
        }
        remaining -= c.power_usage;
        picked.push(c.key);
    }
    picked
}
