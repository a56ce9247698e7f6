use rust_decimal::Decimal;
use sim_core::{ComponentId, ComponentKind, RoomId, UnitId, UpgradeId};
use sim_econ::EconError;
use thiserror::Error;

/// Why a command was rejected. A rejected command never changes state.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: Decimal, available: Decimal },
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("upgrade not found: {0}")]
    UpgradeNotFound(UpgradeId),
    #[error("upgrade already applied: {0}")]
    UpgradeAlreadyApplied(UpgradeId),
    /// Unknown id, or a tier not yet unlocked.
    #[error("component not available: {0}")]
    ComponentUnavailable(ComponentId),
    #[error("unit {0} is still building")]
    StillBuilding(UnitId),
    #[error("missing required components: {0:?}")]
    MissingComponents(Vec<ComponentKind>),
    #[error("name must not be blank")]
    EmptyName,
    #[error(transparent)]
    Econ(#[from] EconError),
}
