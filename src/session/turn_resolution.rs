//! Half-step resolution for GameSession.
//! The tank half collects and applies every action, the shell half advances
//! shells, and the terminal checks run once per round in fixed order.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::game::types::{Action, TankId};
use crate::session::result::{GameEndReason, GameResult};
use crate::session::round_log::TankRecord;
use crate::session::scheduler::GameSession;

/// Every living tank picks its action before any is applied; they are then
/// applied in load order and the world closes the tank half-step.
pub fn resolve_tank_step(this: &mut GameSession) -> Vec<TankRecord> {
    let order = this.order.clone();
    let requests: Vec<(TankId, Option<Action>)> =
        order.into_iter().map(|id| (id, this.request_action(id))).collect();
    let mut records = Vec::with_capacity(requests.len());

    for (id, action) in requests {
        let Some(action) = action else {
            records.push(TankRecord::Dead);
            continue;
        };
        let valid = this.engine.execute_action(id, action);
        // Observation is handed over whether or not the request counted as valid.
        if action == Action::GetBattleInfo {
            this.deliver_battle_info(id);
        }
        records.push(TankRecord::Acted { action, ignored: !valid, killed: false });
    }

    this.engine.end_tank_actions();
    mark_killed(this, &mut records);
    records
}

/// Shells move again on their own; the snapshot for the next round is taken here.
pub fn resolve_shell_step(this: &mut GameSession, mut records: Vec<TankRecord>) -> Vec<TankRecord> {
    this.engine.shells_step();
    mark_killed(this, &mut records);
    records
}

fn mark_killed(this: &GameSession, records: &mut [TankRecord]) {
    for (&id, record) in this.order.iter().zip(records.iter_mut()) {
        if !is_alive(this, id) {
            record.mark_killed();
        }
    }
}

fn is_alive(this: &GameSession, id: TankId) -> bool {
    this.engine.tank(id).is_some_and(|t| t.is_alive)
}

/// Terminal checks, in priority order: one side left (or none), the zero-shells
/// countdown, then the step budget.
pub fn check_game_over(this: &mut GameSession) -> Option<GameResult> {
    let remaining = this
        .players
        .keys()
        .map(|&player| (player, this.engine.alive_tanks(player)))
        .collect::<BTreeMap<_, _>>();
    let standing: Vec<_> = remaining.iter().filter(|&(_, &count)| count > 0).map(|(&p, _)| p).collect();

    let (winner, reason) = if standing.len() <= 1 {
        (standing.first().copied().unwrap_or(0), GameEndReason::AllTanksDead)
    } else if countdown_elapsed(this) {
        (0, GameEndReason::ZeroShells { rounds: this.settings.zero_shells_countdown })
    } else if this.rounds >= this.max_steps {
        (0, GameEndReason::MaxSteps { max_steps: this.max_steps })
    } else {
        return None;
    };

    Some(GameResult {
        game_id: this.game_id,
        winner,
        reason,
        rounds: this.rounds,
        remaining_tanks: remaining,
        final_board: this.engine.board(),
        round_log: this.log.lines(),
    })
}

/// Tick the countdown if armed, or arm it the first round nobody can shoot.
fn countdown_elapsed(this: &mut GameSession) -> bool {
    match this.countdown {
        Some(left) => {
            let left = left.saturating_sub(1);
            this.countdown = Some(left);
            left == 0
        }
        None if this.engine.ammo_of_living_tanks() == 0 && this.engine.shells_in_flight() == 0 => {
            let left = this.settings.zero_shells_countdown;
            info!("[GameSession] Game {} out of shells, ending in {left} rounds", this.game_id);
            this.countdown = Some(left);
            left == 0
        }
        None => {
            debug!("[GameSession] Round {} done", this.rounds);
            false
        }
    }
}
