//! Serializable command surface over [`GameState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sim_core::{Component, ComponentId, RoomId, RoomType, SoftwareKind, UnitId, UpgradeId};

use crate::error::CommandError;
use crate::state::GameState;

/// One player action. `BuildServer` and `BuildPc` carry components that were
/// already paid for through `PurchaseComponent`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    PurchaseComponent(ComponentId),
    BuildServer(Vec<Component>),
    BuildPc(Vec<Component>),
    DevelopSoftware {
        name: String,
        kind: SoftwareKind,
        developers: u32,
    },
    PurchaseUpgrade(UpgradeId),
    Shutdown(UnitId),
    Restart(UnitId),
    PurchaseRoom {
        kind: RoomType,
        position: (i32, i32),
    },
    SetActiveRoom(RoomId),
    UpgradeAirConditioning(RoomId),
    UpgradeLighting {
        room: RoomId,
        color: String,
    },
}

/// Successful result of a [`Command`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Purchased(Component),
    Unit(UnitId),
    Room(RoomId),
    Done,
}

impl GameState {
    /// Runs one command against the state. On error nothing changed.
    pub fn execute(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<Outcome, CommandError> {
        match command {
            Command::PurchaseComponent(id) => self.purchase_component(&id).map(Outcome::Purchased),
            Command::BuildServer(parts) => {
                Ok(Outcome::Unit(self.start_building_server(parts, now)))
            }
            Command::BuildPc(parts) => Ok(Outcome::Unit(self.start_building_pc(parts, now))),
            Command::DevelopSoftware {
                name,
                kind,
                developers,
            } => self
                .start_developing_software(&name, kind, developers, now)
                .map(Outcome::Unit),
            Command::PurchaseUpgrade(id) => self.purchase_upgrade(&id).map(|_| Outcome::Done),
            Command::Shutdown(id) => self.shutdown_server(id).map(|_| Outcome::Done),
            Command::Restart(id) => self.restart_server(id).map(|_| Outcome::Done),
            Command::PurchaseRoom { kind, position } => {
                self.purchase_room(kind, position).map(Outcome::Room)
            }
            Command::SetActiveRoom(id) => self.set_active_room(id).map(|_| Outcome::Done),
            Command::UpgradeAirConditioning(id) => {
                self.upgrade_room_air_conditioning(id).map(|_| Outcome::Done)
            }
            Command::UpgradeLighting { room, color } => {
                self.upgrade_room_lighting(room, &color).map(|_| Outcome::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn commands_route_to_state() {
        let cfg = GameConfig {
            starting_money: Decimal::from(20_000),
            ..GameConfig::default()
        };
        let mut s = GameState::new(&cfg, t0());
        let room = match s
            .execute(
                Command::PurchaseRoom {
                    kind: RoomType::Software,
                    position: (2, 0),
                },
                t0(),
            )
            .unwrap()
        {
            Outcome::Room(id) => id,
            other => panic!("unexpected {other:?}"),
        };
        let unit = s
            .execute(
                Command::DevelopSoftware {
                    name: "Shell".into(),
                    kind: SoftwareKind::Development,
                    developers: 2,
                },
                t0(),
            )
            .unwrap();
        assert!(matches!(unit, Outcome::Unit(_)));
        assert_eq!(s.money(), Decimal::from(5_000));
        assert_eq!(s.room(room).unwrap().units.len(), 1);
        assert_eq!(
            s.execute(Command::UpgradeAirConditioning(room), t0()),
            Ok(Outcome::Done)
        );
    }

    #[test]
    fn rejected_command_leaves_state_untouched() {
        let mut s = GameState::new(&GameConfig::default(), t0());
        let before = serde_json::to_value(&s).unwrap();
        let err = s
            .execute(Command::PurchaseUpgrade(UpgradeId("upgrade-revenue-2".into())), t0())
            .unwrap_err();
        assert!(matches!(err, CommandError::InsufficientFunds { .. }));
        assert_eq!(serde_json::to_value(&s).unwrap(), before);
    }

    #[test]
    fn commands_read_from_json() {
        let json = r#"{"command":"purchase_upgrade","args":"upgrade-power-1"}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(cmd, Command::PurchaseUpgrade(UpgradeId("upgrade-power-1".into())));
        let cmd: Command = serde_json::from_str(
            r#"{"command":"develop_software","args":{"name":"Ops","kind":"OS","developers":1}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::DevelopSoftware {
                name: "Ops".into(),
                kind: SoftwareKind::OS,
                developers: 1
            }
        );
    }
}
