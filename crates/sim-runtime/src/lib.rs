#![deny(warnings)]

//! Simulation runtime: the game state, its commands and the periodic tick.
//!
//! The host owns a single [`GameState`], applies player [`Command`]s to it
//! and calls [`advance`] roughly once a second. Every command and tick is a
//! complete transition; a rejected command leaves the state untouched.

pub mod command;
pub mod config;
pub mod error;
pub mod query;
pub mod queue;
pub mod state;
pub mod tick;

use chrono::{DateTime, Utc};

pub use command::{Command, Outcome};
pub use config::{ConfigError, GameConfig};
pub use error::CommandError;
pub use query::{components_by_kind, format_game_time, room_vacancy};
pub use queue::BuildQueue;
pub use state::{GameState, TIER_UNLOCKS};
pub use tick::{required_build_secs, TickReport};

/// Returns `state` advanced to `now` together with what changed.
pub fn advance(mut state: GameState, now: DateTime<Utc>) -> (GameState, TickReport) {
    let report = state.advance_in_place(now);
    (state, report)
}

/// Returns `state` with `command` applied, or unchanged on error.
pub fn apply(
    mut state: GameState,
    command: Command,
    now: DateTime<Utc>,
) -> (GameState, Result<Outcome, CommandError>) {
    let result = state.execute(command, now);
    (state, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use sim_core::ComponentId;

    #[test]
    fn pure_wrappers_thread_state() {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let state = GameState::new(&GameConfig::default(), t0);
        let buy = Command::PurchaseComponent(ComponentId("cpu-1".into()));
        let (state, res) = apply(state, buy, t0);
        let cpu = match res.unwrap() {
            Outcome::Purchased(c) => c,
            other => panic!("unexpected {other:?}"),
        };
        let (state, res) = apply(state, Command::BuildServer(vec![cpu]), t0);
        assert!(res.is_ok());
        assert_eq!(state.money(), Decimal::from(1800));

        // completing unit earns for the whole 30 s tick
        let (state, report) = advance(state, t0 + Duration::seconds(30));
        assert_eq!(report.completed.len(), 1);
        assert_eq!(state.money(), Decimal::from(1800) + state.revenue_rate() * Decimal::from(30));
        assert_eq!(state.money(), Decimal::from(1830));

        let before = state.money();
        let (state, report) = advance(state, t0 + Duration::seconds(40));
        assert_eq!(report.gross_revenue, Decimal::from(10));
        assert_eq!(state.money(), before + state.revenue_rate() * Decimal::from(10));
        assert_eq!(state.money(), Decimal::from(1840));
    }
}
