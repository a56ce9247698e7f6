//! Pending hardware selection.
//!
//! Components are paid for as they are added. Removing one does not refund
//! it, and draining the queue into a build does not charge again.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Component, ComponentId, ComponentKind, UnitId};
use sim_econ::{estimated_revenue, missing_components, HardwareTarget};
use tracing::debug;

use crate::error::CommandError;
use crate::state::GameState;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildQueue {
    components: Vec<Component>,
}

impl BuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buys `id` from the state's available catalog and queues it.
    pub fn add(
        &mut self,
        state: &mut GameState,
        id: &ComponentId,
    ) -> Result<&Component, CommandError> {
        let component = state.purchase_component(id)?;
        self.components.push(component);
        let last = self.components.len() - 1;
        Ok(&self.components[last])
    }

    /// Drops the component at `index`. The money stays spent.
    pub fn remove(&mut self, index: usize) -> Option<Component> {
        if index < self.components.len() {
            let removed = self.components.remove(index);
            debug!(component = %removed.id, "removed from queue without refund");
            Some(removed)
        } else {
            None
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Sum of what the queued components cost.
    pub fn total_cost(&self) -> Decimal {
        self.components.iter().map(|c| c.cost).sum()
    }

    pub fn estimated_revenue(&self, target: HardwareTarget) -> Decimal {
        estimated_revenue(target, &self.components)
    }

    pub fn missing(&self, target: HardwareTarget) -> Vec<ComponentKind> {
        missing_components(target, &self.components)
    }

    pub fn contains_kind(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind == kind)
    }

    pub fn build_server(
        &mut self,
        state: &mut GameState,
        now: DateTime<Utc>,
    ) -> Result<UnitId, CommandError> {
        self.build(HardwareTarget::Server, state, now)
    }

    pub fn build_pc(
        &mut self,
        state: &mut GameState,
        now: DateTime<Utc>,
    ) -> Result<UnitId, CommandError> {
        self.build(HardwareTarget::Pc, state, now)
    }

    /// Starts a build from the whole queue. An incomplete selection is
    /// rejected and left queued.
    fn build(
        &mut self,
        target: HardwareTarget,
        state: &mut GameState,
        now: DateTime<Utc>,
    ) -> Result<UnitId, CommandError> {
        let missing = self.missing(target);
        if !missing.is_empty() {
            debug!(?target, ?missing, "build refused");
            return Err(CommandError::MissingComponents(missing));
        }
        let components = std::mem::take(&mut self.components);
        Ok(match target {
            HardwareTarget::Server => state.start_building_server(components, now),
            HardwareTarget::Pc => state.start_building_pc(components, now),
        })
    }
}
