//! Per-round action log.
//!
//! One line per round, one comma-separated entry per tank in load order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::types::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankRecord {
    Acted { action: Action, ignored: bool, killed: bool },
    /// Dead before the round started.
    Dead,
}

impl TankRecord {
    pub fn mark_killed(&mut self) {
        if let TankRecord::Acted { killed, .. } = self {
            *killed = true;
        }
    }
}

impl fmt::Display for TankRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TankRecord::Dead => f.write_str("killed"),
            TankRecord::Acted { action, ignored, killed } => {
                write!(f, "{action}")?;
                if *ignored {
                    f.write_str(" (ignored)")?;
                }
                if *killed {
                    f.write_str(" (killed)")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    rounds: Vec<Vec<TankRecord>>,
}

impl RoundLog {
    pub fn push_round(&mut self, records: Vec<TankRecord>) {
        self.rounds.push(records);
    }

    pub fn rounds(&self) -> &[Vec<TankRecord>] {
        &self.rounds
    }

    pub fn lines(&self) -> Vec<String> {
        self.rounds
            .iter()
            .map(|round| round.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_line_format() {
        let mut log = RoundLog::default();
        let mut shot = TankRecord::Acted { action: Action::MoveForward, ignored: false, killed: false };
        shot.mark_killed();
        log.push_round(vec![
            TankRecord::Acted { action: Action::Shoot, ignored: false, killed: false },
            TankRecord::Acted { action: Action::RotateLeft45, ignored: true, killed: false },
            shot,
            TankRecord::Dead,
        ]);
        assert_eq!(
            log.lines(),
            vec!["Shoot, RotateLeft45 (ignored), MoveForward (killed), killed".to_string()]
        );
    }
}
